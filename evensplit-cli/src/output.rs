//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_decimal::Decimal;
use serde::Serialize;

use evensplit_core::ledger::round_currency;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print a value as pretty JSON on stdout
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount as currency, e.g. `-$30.00`
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    let rounded = round_currency(amount);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{}{}{:.2}", sign, symbol, rounded.abs())
}

/// Format a net balance, green when owed money and red when owing
pub fn format_balance(amount: Decimal, symbol: &str) -> String {
    let text = format_money(amount, symbol);
    let rounded = round_currency(amount);
    if rounded > Decimal::ZERO {
        text.green().to_string()
    } else if rounded < Decimal::ZERO {
        text.red().to_string()
    } else {
        text
    }
}
