//! CLI command implementations

pub mod balances;
pub mod compute;
pub mod config;
pub mod expense;
pub mod group;
pub mod logs;
pub mod settle;
pub mod user;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use evensplit_core::{EntryPoint, EvenSplitContext, LogEvent, LoggingService};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV_VAR: &str = "EVENSPLIT_DIR";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default (~/.evensplit)
pub fn get_data_dir() -> Result<PathBuf> {
    match std::env::var(DATA_DIR_ENV_VAR) {
        Ok(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::home_dir()
            .map(|home| home.join(".evensplit"))
            .ok_or_else(|| anyhow!("Could not find home directory; set {}", DATA_DIR_ENV_VAR)),
    }
}

/// Open the ledger in the data directory, creating it on first use
pub fn get_context() -> Result<EvenSplitContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    EvenSplitContext::new(&data_dir).context("Failed to initialize evensplit context")
}
