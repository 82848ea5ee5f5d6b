//! Group commands - create groups, manage members, inspect a group

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a new group
    New {
        /// Group name
        name: String,
        /// Comma-separated user IDs to add as members
        #[arg(long, value_delimiter = ',')]
        members: Vec<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all groups
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a user to a group
    AddMember {
        group_id: i64,
        user_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a group's members and expenses
    Show {
        group_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl GroupCommands {
    pub fn json(&self) -> bool {
        match self {
            GroupCommands::New { json, .. }
            | GroupCommands::List { json }
            | GroupCommands::AddMember { json, .. }
            | GroupCommands::Show { json, .. } => *json,
        }
    }

    pub fn group_id(&self) -> Option<i64> {
        match self {
            GroupCommands::AddMember { group_id, .. } | GroupCommands::Show { group_id, .. } => {
                Some(*group_id)
            }
            _ => None,
        }
    }
}

pub fn run(command: GroupCommands) -> Result<()> {
    let ctx = get_context()?;
    let symbol = ctx.config.currency_symbol.clone();

    match command {
        GroupCommands::New { name, members, json } => {
            let group = ctx.group_service.create_group(&name, &members)?;
            if json {
                return output::json(&group);
            }
            output::success(&format!("Created group {} (id {})", group.name, group.id));
        }
        GroupCommands::List { json } => {
            let groups = ctx.group_service.list_groups()?;
            if json {
                return output::json(&groups);
            }
            if groups.is_empty() {
                println!("No groups yet. Create one with {}", "split group new <NAME>".bold());
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name"]);
            for group in groups {
                table.add_row(vec![group.id.to_string(), group.name]);
            }
            println!("{}", table);
        }
        GroupCommands::AddMember { group_id, user_id, json } => {
            let added = ctx.group_service.add_member(group_id, user_id)?;
            if json {
                return output::json(&serde_json::json!({
                    "group_id": group_id,
                    "user_id": user_id,
                    "added": added,
                }));
            }
            if added {
                output::success(&format!("Added user {} to group {}", user_id, group_id));
            } else {
                output::info(&format!("User {} is already in group {}", user_id, group_id));
            }
        }
        GroupCommands::Show { group_id, json } => {
            let detail = ctx.group_service.group_detail(group_id)?;
            if json {
                return output::json(&detail);
            }

            println!("{} {}", detail.name.bold(), format!("(id {})", detail.id).dimmed());
            println!();

            println!("{}", "Members".bold());
            if detail.members.is_empty() {
                println!("  none");
            } else {
                let mut table = output::create_table();
                table.set_header(vec!["ID", "Name"]);
                for member in &detail.members {
                    table.add_row(vec![member.id.to_string(), member.name.clone()]);
                }
                println!("{}", table);
            }
            println!();

            println!("{}", "Expenses".bold());
            if detail.expenses.is_empty() {
                println!("  none");
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Date", "Paid by", "Amount", "Description"]);
            for expense in &detail.expenses {
                let payer = detail
                    .member_name(expense.payer_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("user {}", expense.payer_id));
                table.add_row(vec![
                    expense.id.to_string(),
                    expense.created_at.format("%Y-%m-%d").to_string(),
                    payer,
                    output::format_money(expense.amount, &symbol),
                    expense.description.clone(),
                ]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
