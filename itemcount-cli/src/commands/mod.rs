//! CLI command implementations

pub mod check;
pub mod configure;
pub mod currencies;
pub mod list;
pub mod logs;
pub mod remove;
pub mod uninstall;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use itemcount_core::{EntryPoint, ItemCountContext, LogEvent, LoggingService};

/// Shared handle to the CLI's event log
///
/// The CLI opens it once per invocation and passes it everywhere, so there
/// is never a second instance on the same logs.duckdb.
pub type Logger = Option<Arc<LoggingService>>;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Logger {
    let data_dir = get_data_dir().ok()?;
    // Ensure directory exists
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(Arc::new)
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Logger, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ITEMCOUNT_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".itemcount"))
        .ok_or_else(|| anyhow!("Could not find home directory, set ITEMCOUNT_DIR"))
}

/// Get or create the item-count context, sharing the command's logger
pub fn get_context(logger: &Logger) -> Result<ItemCountContext> {
    let data_dir = get_data_dir()?;

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let ctx = ItemCountContext::new(&data_dir).context("Failed to initialize item-count context")?;

    Ok(match logger {
        Some(logger) => ctx.with_logger(Arc::clone(logger)),
        None => ctx,
    })
}
