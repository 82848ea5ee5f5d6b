//! EvenSplit Core - shared expenses and debt settlement
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: value types (User, Group, Expense, Settlement) and errors
//! - **ledger**: the pure engine computing net balances and settlements
//! - **ports**: trait definitions for storage (LedgerRepository)
//! - **services**: use-case orchestration, logging and migrations
//! - **adapters**: concrete implementations (DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ledger;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbRepository;
use config::Config;
use services::GroupService;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Expense, ExpenseRecord, Group, GroupDetail, GroupSnapshot, NetBalances, Settlement, User,
};
pub use ledger::{compute_net_balances, residual_balances, simplify_debts};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for EvenSplit operations
///
/// Holds the configuration, the database connection and the services
/// built on top of it.
pub struct EvenSplitContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub repository: Arc<DuckDbRepository>,
    pub group_service: GroupService,
}

impl EvenSplitContext {
    /// Open the ledger in `data_dir`, creating and migrating it if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let db_path = data_dir.join(&config.database_file);

        let repository = Arc::new(
            DuckDbRepository::new(&db_path)
                .with_context(|| format!("Failed to open database {}", db_path.display()))?,
        );
        repository.ensure_schema()?;

        let group_service = GroupService::new(repository.clone());

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            repository,
            group_service,
        })
    }
}
