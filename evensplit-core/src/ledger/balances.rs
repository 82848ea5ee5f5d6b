//! Balance calculator

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use rust_decimal::Decimal;

use super::round_currency;
use crate::domain::result::{Error, Result};
use crate::domain::{Expense, NetBalances};

/// Compute each member's net position from a group's expenses
///
/// Every expense is split evenly across all of `members`, including the
/// payer. Totals are accumulated unrounded and each member's
/// `paid - owed` is rounded to cents once at the end.
///
/// An empty member set yields an empty map. An expense whose payer is not
/// in `members`, or totals beyond the range of [`Decimal`], are rejected
/// with [`Error::Validation`].
pub fn compute_net_balances<M>(members: &BTreeSet<M>, expenses: &[Expense<M>]) -> Result<NetBalances<M>>
where
    M: Ord + Clone + Display,
{
    if members.is_empty() {
        return Ok(NetBalances::new());
    }

    let headcount = Decimal::from(members.len());
    let mut paid: BTreeMap<&M, Decimal> = members.iter().map(|m| (m, Decimal::ZERO)).collect();
    let mut owed: BTreeMap<&M, Decimal> = paid.clone();

    for expense in expenses {
        let payer_total = paid.get_mut(&expense.payer).ok_or_else(|| {
            Error::validation(format!("payer {} is not a member of the group", expense.payer))
        })?;
        *payer_total = checked_total(*payer_total, expense.amount)?;

        let share = expense.amount / headcount;
        for total in owed.values_mut() {
            *total = checked_total(*total, share)?;
        }
    }

    Ok(members
        .iter()
        .map(|m| {
            let net = paid[m] - owed[m];
            (m.clone(), round_currency(net))
        })
        .collect())
}

fn checked_total(total: Decimal, amount: Decimal) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| Error::validation("amount total out of range"))
}

/// Sum of all balances
///
/// Close to zero but not exactly: each member's rounding can move the sum
/// by up to half a cent, so the bound is `0.005 * members`.
pub fn total_balance<M>(net: &NetBalances<M>) -> Decimal {
    net.values().copied().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_single_payer_three_members() {
        let net = compute_net_balances(&members(&[1, 2, 3]), &[Expense::new(1, dec(90))]).unwrap();

        assert_eq!(net[&1], dec(60));
        assert_eq!(net[&2], dec(-30));
        assert_eq!(net[&3], dec(-30));
    }

    #[test]
    fn test_offsetting_expenses_cancel_out() {
        let expenses = vec![Expense::new(1, dec(50)), Expense::new(2, dec(50))];
        let net = compute_net_balances(&members(&[1, 2]), &expenses).unwrap();

        assert_eq!(net[&1], Decimal::ZERO);
        assert_eq!(net[&2], Decimal::ZERO);
    }

    #[test]
    fn test_empty_members_returns_empty_map() {
        let net = compute_net_balances::<i64>(&BTreeSet::new(), &[]).unwrap();
        assert!(net.is_empty());
    }

    #[test]
    fn test_members_without_expenses_are_settled() {
        let net = compute_net_balances(&members(&[4, 5]), &[]).unwrap();
        assert_eq!(net.len(), 2);
        assert!(net.values().all(|b| b.is_zero()));
    }

    #[test]
    fn test_non_member_payer_is_rejected() {
        let err = compute_net_balances(&members(&[1, 2]), &[Expense::new(9, dec(10))]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("payer 9"));
    }

    #[test]
    fn test_uneven_division_rounds_once_per_member() {
        // 100 / 3 leaves a repeating share; rounding happens on the totals
        let net = compute_net_balances(&members(&[1, 2, 3]), &[Expense::new(1, dec(100))]).unwrap();

        assert_eq!(net[&1], Decimal::new(6667, 2));
        assert_eq!(net[&2], Decimal::new(-3333, 2));
        assert_eq!(net[&3], Decimal::new(-3333, 2));
        assert!(total_balance(&net).abs() <= Decimal::new(1, 2));
    }

    #[test]
    fn test_small_shares_accumulate_before_rounding() {
        // Three expenses of 0.01 among three people: each share is 0.00333...
        // and only survives if the totals are rounded, not the shares.
        let expenses = vec![
            Expense::new(1, Decimal::new(1, 2)),
            Expense::new(1, Decimal::new(1, 2)),
            Expense::new(1, Decimal::new(1, 2)),
        ];
        let net = compute_net_balances(&members(&[1, 2, 3]), &expenses).unwrap();

        assert_eq!(net[&1], Decimal::new(2, 2));
        assert_eq!(net[&2], Decimal::new(-1, 2));
        assert_eq!(net[&3], Decimal::new(-1, 2));
    }

    #[test]
    fn test_idempotent() {
        let m = members(&[1, 2, 3, 4]);
        let expenses = vec![
            Expense::new(2, Decimal::new(1999, 2)),
            Expense::new(3, Decimal::new(7, 0)),
            Expense::new(2, Decimal::new(12345, 2)),
        ];

        let first = compute_net_balances(&m, &expenses).unwrap();
        let second = compute_net_balances(&m, &expenses).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rounding_drift_can_exceed_one_cent() {
        // shares of 0.005 round away from zero for everyone
        let net = compute_net_balances(&members(&[1, 2, 3, 4, 5, 6]), &[Expense::new(1, Decimal::new(3, 2))])
            .unwrap();

        assert_eq!(net[&1], Decimal::new(3, 2));
        assert!((2..=6).all(|m| net[&m] == Decimal::new(-1, 2)));
        assert_eq!(total_balance(&net), Decimal::new(-2, 2));
        assert!(total_balance(&net).abs() <= Decimal::new(5, 3) * Decimal::from(6));
    }

    #[test]
    fn test_overflowing_totals_are_rejected() {
        let huge = Decimal::from_str_exact("60000000000000000000000000000").unwrap();
        let expenses = vec![Expense::new(1, huge), Expense::new(1, huge)];

        let err = compute_net_balances(&members(&[1, 2]), &expenses).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_zero_sum_over_many_expenses() {
        let m = members(&[1, 2, 3, 4, 5, 6, 7]);
        let expenses: Vec<Expense<i64>> = (0..40)
            .map(|i| Expense::new(1 + (i % 7), Decimal::new(1013 + i * 37, 2)))
            .collect();

        let net = compute_net_balances(&m, &expenses).unwrap();
        // each member's rounding moves the total by at most half a cent
        let tolerance = Decimal::new(5, 3) * Decimal::from(m.len());
        assert!(total_balance(&net).abs() <= tolerance);
    }
}
