//! User commands - register and list people

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Add {
        /// Display name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl UserCommands {
    pub fn json(&self) -> bool {
        match self {
            UserCommands::Add { json, .. } | UserCommands::List { json } => *json,
        }
    }
}

pub fn run(command: UserCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        UserCommands::Add { name, json } => {
            let user = ctx.group_service.create_user(&name)?;
            if json {
                return output::json(&user);
            }
            output::success(&format!("Created user {} (id {})", user.name, user.id));
        }
        UserCommands::List { json } => {
            let users = ctx.group_service.list_users()?;
            if json {
                return output::json(&users);
            }
            if users.is_empty() {
                println!("No users yet. Add one with {}", "split user add <NAME>".bold());
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name"]);
            for user in users {
                table.add_row(vec![user.id.to_string(), user.name]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
