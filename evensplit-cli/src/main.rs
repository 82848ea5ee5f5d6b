//! EvenSplit CLI - shared expenses in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{balances, compute, config, expense, group, logs, settle, user};
use evensplit_core::{Error, LogEvent, OperationResult};

/// EvenSplit - split shared expenses and settle up with the fewest transfers
#[derive(Parser)]
#[command(name = "split", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Manage groups and their members
    Group {
        #[command(subcommand)]
        command: group::GroupCommands,
    },

    /// Record expenses
    Expense {
        #[command(subcommand)]
        command: expense::ExpenseCommands,
    },

    /// Show each member's net balance in a group
    Balances {
        group_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the transfers that settle a group
    Settle {
        group_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute balances and settlements for a JSON snapshot (file or stdin)
    Compute {
        /// Snapshot file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or update settings
    Config {
        /// Currency symbol used in output
        #[arg(long)]
        currency_symbol: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::User { .. } => "user",
            Commands::Group { .. } => "group",
            Commands::Expense { .. } => "expense",
            Commands::Balances { .. } => "balances",
            Commands::Settle { .. } => "settle",
            Commands::Compute { .. } => "compute",
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }

    fn json(&self) -> bool {
        match self {
            Commands::User { command } => command.json(),
            Commands::Group { command } => command.json(),
            Commands::Expense { command } => command.json(),
            Commands::Logs { command } => command.json(),
            Commands::Balances { json, .. }
            | Commands::Settle { json, .. }
            | Commands::Compute { json, .. }
            | Commands::Config { json, .. } => *json,
        }
    }

    fn group_id(&self) -> Option<i64> {
        match self {
            Commands::Group { command } => command.group_id(),
            Commands::Expense { command } => command.group_id(),
            Commands::Balances { group_id, .. } | Commands::Settle { group_id, .. } => Some(*group_id),
            _ => None,
        }
    }

    fn event(&self, event: &str) -> LogEvent {
        let log_event = LogEvent::new(event).with_command(self.name());
        match self.group_id() {
            Some(id) => log_event.with_group(id),
            None => log_event,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.command.json();

    // the logs command manages the log itself
    let logger = match cli.command {
        Commands::Logs { .. } => None,
        _ => commands::get_logger(),
    };
    let started = cli.command.event("command_executed");
    let failed = cli.command.event("command_failed");
    commands::log_event(&logger, started);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let user_error = e
                .downcast_ref::<Error>()
                .map(Error::is_user_error)
                .unwrap_or(false);
            if !user_error {
                commands::log_event(&logger, failed.with_error(e.to_string()));
            }

            if json {
                let result = OperationResult::<()>::fail(e.to_string());
                if let Ok(text) = serde_json::to_string_pretty(&result) {
                    println!("{}", text);
                }
            } else {
                output::error(&format!("Error: {:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::User { command } => user::run(command),
        Commands::Group { command } => group::run(command),
        Commands::Expense { command } => expense::run(command),
        Commands::Balances { group_id, json } => balances::run(group_id, json),
        Commands::Settle { group_id, json } => settle::run(group_id, json),
        Commands::Compute { file, json } => compute::run(file.as_deref(), json),
        Commands::Config { currency_symbol, json } => config::run(currency_symbol, json),
        Commands::Logs { command } => logs::run(command),
    }
}
