//! Settle command - the transfers that square a group up

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;

use evensplit_core::ledger::round_currency;
use evensplit_core::{residual_balances, simplify_debts};

use super::get_context;
use crate::output;

pub fn run(group_id: i64, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let detail = ctx.group_service.group_detail(group_id)?;
    let net = detail.snapshot().net_balances()?;
    let settlements = simplify_debts(&net);

    // rounding can leave a cent nobody is matched against
    let unsettled: Vec<(i64, Decimal)> = residual_balances(&net, &settlements)
        .into_iter()
        .map(|(id, left)| (id, round_currency(left)))
        .filter(|(_, left)| !left.is_zero())
        .collect();

    if json {
        return output::json(&serde_json::json!({
            "group_id": group_id,
            "settlements": settlements,
            "unsettled": unsettled
                .iter()
                .map(|(id, left)| serde_json::json!({"user_id": id, "amount": left}))
                .collect::<Vec<_>>(),
        }));
    }

    let symbol = &ctx.config.currency_symbol;
    let name = |id: i64| {
        detail
            .member_name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("user {}", id))
    };

    if settlements.is_empty() {
        output::success(&format!("{} is settled up.", detail.name));
    } else {
        println!("{} {}", "Settlements for".bold(), detail.name.bold());
        let mut table = output::create_table();
        table.set_header(vec!["From", "To", "Amount"]);
        for s in &settlements {
            table.add_row(vec![name(s.from), name(s.to), output::format_money(s.amount, symbol)]);
        }
        println!("{}", table);
    }

    for (id, left) in unsettled {
        output::warning(&format!(
            "Rounding leaves {} with {} unsettled",
            name(id),
            output::format_money(left, symbol)
        ));
    }

    Ok(())
}
