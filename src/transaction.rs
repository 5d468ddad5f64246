//! The unit of work statements run under.

use async_trait::async_trait;

use crate::driver::Connection;
use crate::error::Result;

/// The unit of work an executor runs statements under.
///
/// [`connection`](Transaction::connection) always hands out the same live
/// connection until the transaction is committed or rolled back, which is
/// what lets the explain shadow see the primary statement's snapshot and locks.
#[async_trait]
pub trait Transaction: Send {
    /// The live connection for the statement currently executing. Opens one
    /// when none is held yet.
    async fn connection(&mut self) -> Result<&mut dyn Connection>;

    /// Whether a live connection is currently held, i.e. whether
    /// [`connection`](Transaction::connection) would reuse rather than open.
    fn is_active(&self) -> bool;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}
