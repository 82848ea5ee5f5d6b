//! Balances command - who is owed and who owes within a group

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;

use super::get_context;
use crate::output;

#[derive(Serialize)]
struct MemberBalance {
    user_id: i64,
    name: String,
    balance: Decimal,
}

pub fn run(group_id: i64, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let detail = ctx.group_service.group_detail(group_id)?;
    let net = detail.snapshot().net_balances()?;

    let rows: Vec<MemberBalance> = net
        .iter()
        .map(|(id, balance)| MemberBalance {
            user_id: *id,
            name: detail.member_name(*id).unwrap_or_default().to_string(),
            balance: *balance,
        })
        .collect();

    if json {
        return output::json(&serde_json::json!({
            "group_id": group_id,
            "balances": rows,
        }));
    }

    println!("{} {}", "Balances for".bold(), detail.name.bold());
    if rows.is_empty() {
        println!("  Group has no members.");
        return Ok(());
    }

    let symbol = &ctx.config.currency_symbol;
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Balance"]);
    for row in rows {
        table.add_row(vec![
            row.user_id.to_string(),
            row.name,
            output::format_balance(row.balance, symbol),
        ]);
    }
    println!("{}", table);
    println!("{}", "Positive: owed money. Negative: owes money.".dimmed());

    Ok(())
}
