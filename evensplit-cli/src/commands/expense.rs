//! Expense commands - record who paid for what

use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense paid by one member and shared by the whole group
    Add {
        group_id: i64,
        /// User ID of the member who paid
        #[arg(long)]
        payer: i64,
        /// Amount paid, at most two decimal places
        #[arg(long)]
        amount: Decimal,
        /// What the money was spent on
        #[arg(long, short, default_value = "")]
        description: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ExpenseCommands {
    pub fn json(&self) -> bool {
        match self {
            ExpenseCommands::Add { json, .. } => *json,
        }
    }

    pub fn group_id(&self) -> Option<i64> {
        match self {
            ExpenseCommands::Add { group_id, .. } => Some(*group_id),
        }
    }
}

pub fn run(command: ExpenseCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        ExpenseCommands::Add { group_id, payer, amount, description, json } => {
            let record = ctx
                .group_service
                .add_expense(group_id, payer, amount, &description)?;
            if json {
                return output::json(&record);
            }
            output::success(&format!(
                "Recorded expense {} of {} paid by user {}",
                record.id,
                output::format_money(record.amount, &ctx.config.currency_symbol),
                record.payer_id
            ));
        }
    }

    Ok(())
}
