//! shadow-explain - run one SQL statement against SQLite with its EXPLAIN plan logged
//!
//! The statement goes through the explain interceptor exactly as library
//! callers' statements do, so the plan lines appear in the log right after
//! the statement's own `==>`/`<==` lines.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use shadow_explain::config::{self, Configuration};
use shadow_explain::sqlite::{open_pool, SqliteTransaction};
use shadow_explain::{ExplainError, Parameter, Result, Row, SqlCommandType, SqlSession, Value};

const STATEMENT_ID: &str = "cli.statement";

#[derive(Parser)]
#[command(name = "shadow-explain")]
#[command(version = "0.1.0")]
#[command(about = "Run a SQL statement and log its EXPLAIN plan")]
struct Cli {
    /// SQL to run; `#{name}` placeholders are bound from --param
    sql: String,

    /// SQLite database URL
    #[arg(short, long, default_value = "sqlite::memory:")]
    database_url: String,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQL script executed before the statement (schema, fixtures)
    #[arg(short, long)]
    setup: Option<PathBuf>,

    /// Parameter as name=value (repeatable)
    #[arg(short, long = "param")]
    params: Vec<String>,

    /// Override the statement log implementation (tracing, stdout, no_logging)
    #[arg(long)]
    log_impl: Option<String>,

    /// Commit instead of rolling back
    #[arg(long)]
    commit: bool,

    /// Enable verbose/debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: --verbose flag, then RUST_LOG env var, then plan lines only
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "info,shadow_explain::statement=debug".to_string())
    };
    tracing_subscriber::fmt().with_env_filter(&log_level).init();

    info!("Starting shadow-explain v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = match &cli.config {
        Some(path) => {
            let settings = config::load_config(path)?;
            info!("Loaded configuration from {:?}", path);
            settings
        }
        None => config::load_config_from_str("")?,
    };
    if let Some(log_impl) = &cli.log_impl {
        settings.log_impl = log_impl.parse()?;
    }

    let parameter = parse_params(&cli.params)?;
    let command_type = SqlCommandType::from_sql(&cli.sql);

    let mut configuration = Configuration::new(settings);
    let ms = configuration
        .statement_builder(STATEMENT_ID, &cli.sql, command_type)
        .build()?;
    configuration.add_mapped_statement(ms)?;

    let pool = open_pool(&cli.database_url).await?;
    if let Some(path) = &cli.setup {
        let script = tokio::fs::read_to_string(path).await?;
        sqlx::raw_sql(&script).execute(&pool).await?;
        info!("Applied setup script {:?}", path);
    }

    let mut session = SqlSession::open(Arc::new(configuration), SqliteTransaction::new(pool));
    let outcome = match command_type {
        SqlCommandType::Select | SqlCommandType::Unknown => session
            .select_list(STATEMENT_ID, &parameter)
            .await
            .map(|rows| print_rows(&rows)),
        _ => session
            .update(STATEMENT_ID, &parameter)
            .await
            .map(|n| println!("{} row(s) affected", n)),
    };

    if cli.commit && outcome.is_ok() {
        session.commit().await?;
        info!("Committed");
    } else {
        session.rollback().await?;
    }
    outcome
}

/// `name=value` pairs into a map parameter; no pairs means no parameter.
fn parse_params(pairs: &[String]) -> Result<Parameter> {
    if pairs.is_empty() {
        return Ok(Parameter::None);
    }
    let mut parsed = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let (name, raw) = pair.split_once('=').ok_or_else(|| {
            ExplainError::Config(format!("Invalid parameter '{}', expected name=value", pair))
        })?;
        parsed.push((name.trim().to_string(), parse_value(raw)));
    }
    Ok(Parameter::from_pairs(parsed))
}

fn parse_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        Value::Null
    } else if let Ok(v) = raw.parse::<i64>() {
        Value::Integer(v)
    } else if let Ok(v) = raw.parse::<f64>() {
        Value::Real(v)
    } else if let Ok(v) = raw.parse::<bool>() {
        Value::Boolean(v)
    } else {
        let unquoted = raw
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .unwrap_or(raw);
        Value::Text(unquoted.to_string())
    }
}

fn print_rows(rows: &[Row]) {
    if let Some(first) = rows.first() {
        println!("{}", first.metadata().labels().join(" | "));
    }
    for row in rows {
        let values: Vec<String> = row.values().iter().map(Value::to_string).collect();
        println!("{}", values.join(" | "));
    }
    println!("({} row(s))", rows.len());
}
