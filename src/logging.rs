//! Logging macros that set target to "shadow_explain" for all crate-internal log calls.
//!
//! Statement logs (the plan lines themselves) do not go through these macros;
//! they use [`crate::log::StatementLog`] so that each mapped statement can be
//! switched on or off independently.

macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!(target: "shadow_explain", $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!(target: "shadow_explain", $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { ::tracing::info!(target: "shadow_explain", $($arg)*) };
}
