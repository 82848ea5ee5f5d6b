//! Compute command - run the ledger on a JSON snapshot without a database
//!
//! Input format:
//! ```json
//! { "members": ["alice", "bob"],
//!   "expenses": [{ "payer": "alice", "amount": "90.00", "description": "dinner" }] }
//! ```

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use evensplit_core::config::Config;
use evensplit_core::{simplify_debts, GroupSnapshot};

use super::get_data_dir;
use crate::output;

fn read_input(file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    if atty::is(atty::Stream::Stdin) {
        anyhow::bail!("No snapshot provided. Pass a FILE or pipe JSON on stdin.");
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn currency_symbol() -> String {
    get_data_dir()
        .ok()
        .and_then(|dir| Config::load(&dir).ok())
        .unwrap_or_default()
        .currency_symbol
}

/// Parse a snapshot and hold its amounts to the rules stored expenses follow
fn parse_snapshot(input: &str) -> Result<GroupSnapshot<String>> {
    let snapshot: GroupSnapshot<String> =
        serde_json::from_str(input).context("Invalid group snapshot")?;
    snapshot.validate()?;
    Ok(snapshot)
}

pub fn run(file: Option<&Path>, json: bool) -> Result<()> {
    let input = read_input(file)?;
    let snapshot = parse_snapshot(&input)?;

    let net = snapshot.net_balances()?;
    let settlements = simplify_debts(&net);

    if json {
        return output::json(&serde_json::json!({
            "balances": net,
            "settlements": settlements,
        }));
    }

    let symbol = currency_symbol();

    println!("{}", "Balances".bold());
    let mut table = output::create_table();
    table.set_header(vec!["Member", "Balance"]);
    for (member, balance) in &net {
        table.add_row(vec![member.clone(), output::format_balance(*balance, &symbol)]);
    }
    println!("{}", table);
    println!();

    if settlements.is_empty() {
        output::success("Nothing to settle.");
        return Ok(());
    }

    println!("{}", "Settlements".bold());
    let mut table = output::create_table();
    table.set_header(vec!["From", "To", "Amount"]);
    for s in settlements {
        table.add_row(vec![s.from, s.to, output::format_money(s.amount, &symbol)]);
    }
    println!("{}", table);

    Ok(())
}
