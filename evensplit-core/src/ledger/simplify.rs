//! Debt simplifier - greedy largest-first matching

use std::cmp::Ordering;

use rust_decimal::Decimal;

use super::{round_currency, SETTLE_EPSILON};
use crate::domain::{NetBalances, Settlement};

/// Produce transfers that settle every balance in `net`
///
/// Creditors and debtors are each sorted by amount descending, then by
/// member ascending, and matched pairwise: the largest debtor pays the
/// largest creditor as much as both can absorb, and whichever side drops
/// below one cent moves on. The result is deterministic for a given input.
///
/// Balances that do not sum to zero leave a small unsettled residue
/// instead of failing.
pub fn simplify_debts<M>(net: &NetBalances<M>) -> Vec<Settlement<M>>
where
    M: Ord + Clone,
{
    let mut creditors: Vec<(M, Decimal)> = Vec::new();
    let mut debtors: Vec<(M, Decimal)> = Vec::new();

    for (member, balance) in net {
        let rounded = round_currency(*balance);
        match rounded.cmp(&Decimal::ZERO) {
            Ordering::Greater => creditors.push((member.clone(), rounded)),
            Ordering::Less => debtors.push((member.clone(), -rounded)),
            Ordering::Equal => {}
        }
    }

    sort_largest_first(&mut creditors);
    sort_largest_first(&mut debtors);

    let mut settlements = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].1.min(creditors[j].1);
        settlements.push(Settlement::new(
            debtors[i].0.clone(),
            creditors[j].0.clone(),
            round_currency(amount),
        ));

        debtors[i].1 -= amount;
        creditors[j].1 -= amount;

        if debtors[i].1.abs() < SETTLE_EPSILON {
            i += 1;
        }
        if creditors[j].1.abs() < SETTLE_EPSILON {
            j += 1;
        }
    }

    settlements
}

/// Apply `settlements` to a copy of `net` and return what is left
///
/// Each transfer raises the payer's balance and lowers the receiver's by
/// its amount. For a plan produced by [`simplify_debts`] from a zero-sum
/// ledger every remaining balance is within one cent of zero.
pub fn residual_balances<M>(net: &NetBalances<M>, settlements: &[Settlement<M>]) -> NetBalances<M>
where
    M: Ord + Clone,
{
    let mut remaining = net.clone();
    for settlement in settlements {
        *remaining.entry(settlement.from.clone()).or_insert(Decimal::ZERO) += settlement.amount;
        *remaining.entry(settlement.to.clone()).or_insert(Decimal::ZERO) -= settlement.amount;
    }
    remaining
}

fn sort_largest_first<M: Ord>(entries: &mut [(M, Decimal)]) {
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Expense;
    use crate::ledger::compute_net_balances;
    use std::collections::BTreeSet;

    fn net(entries: &[(i64, i64)]) -> NetBalances<i64> {
        entries
            .iter()
            .map(|(m, cents)| (*m, Decimal::new(*cents, 2)))
            .collect()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn assert_settles(net: &NetBalances<i64>, plan: &[Settlement<i64>]) {
        for (member, left) in residual_balances(net, plan) {
            assert!(
                left.abs() <= SETTLE_EPSILON,
                "member {} left with {}",
                member,
                left
            );
        }
        assert!(plan.iter().all(|s| s.from != s.to));
        assert!(plan.iter().all(|s| s.amount > Decimal::ZERO));
    }

    #[test]
    fn test_one_creditor_two_debtors() {
        let balances = net(&[(1, 6000), (2, -3000), (3, -3000)]);
        let plan = simplify_debts(&balances);

        assert_eq!(
            plan,
            vec![
                Settlement::new(2, 1, dec(30)),
                Settlement::new(3, 1, dec(30)),
            ]
        );
        assert_settles(&balances, &plan);
    }

    #[test]
    fn test_all_settled_produces_nothing() {
        let plan = simplify_debts(&net(&[(1, 0), (2, 0)]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let plan = simplify_debts::<i64>(&NetBalances::new());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_largest_debtor_pays_largest_creditor_first() {
        let balances = net(&[(1, 1000), (2, 4000), (3, -4500), (4, -500)]);
        let plan = simplify_debts(&balances);

        assert_eq!(
            plan,
            vec![
                Settlement::new(3, 2, dec(40)),
                Settlement::new(3, 1, dec(5)),
                Settlement::new(4, 1, dec(5)),
            ]
        );
        assert_settles(&balances, &plan);
    }

    #[test]
    fn test_ties_break_on_member_ascending() {
        let balances = net(&[(9, -1000), (4, -1000), (7, 2000)]);
        let plan = simplify_debts(&balances);

        assert_eq!(plan[0].from, 4);
        assert_eq!(plan[1].from, 9);
    }

    #[test]
    fn test_string_members() {
        let balances: NetBalances<String> = [
            ("zoe".to_string(), dec(-15)),
            ("adam".to_string(), dec(15)),
        ]
        .into_iter()
        .collect();

        let plan = simplify_debts(&balances);
        assert_eq!(plan, vec![Settlement::new("zoe".to_string(), "adam".to_string(), dec(15))]);
    }

    #[test]
    fn test_unbalanced_input_leaves_residue() {
        // debts exceed credits by 5; the extra simply stays unsettled
        let balances = net(&[(1, 1000), (2, -1500)]);
        let plan = simplify_debts(&balances);

        assert_eq!(plan, vec![Settlement::new(2, 1, dec(10))]);
        let left = residual_balances(&balances, &plan);
        assert_eq!(left[&2], dec(-5));
    }

    #[test]
    fn test_unrounded_balances_are_rounded_first() {
        let balances: NetBalances<i64> = [
            (1, Decimal::new(10004, 3)),
            (2, Decimal::new(-10004, 3)),
            (3, Decimal::new(-4, 3)),
        ]
        .into_iter()
        .collect();

        let plan = simplify_debts(&balances);
        assert_eq!(plan, vec![Settlement::new(2, 1, Decimal::new(1000, 2))]);
    }

    #[test]
    fn test_uneven_three_way_split_settles_within_a_cent() {
        let members: BTreeSet<i64> = [1, 2, 3].into_iter().collect();
        let balances = compute_net_balances(&members, &[Expense::new(1, dec(100))]).unwrap();
        let plan = simplify_debts(&balances);

        assert_eq!(
            plan,
            vec![
                Settlement::new(2, 1, Decimal::new(3333, 2)),
                Settlement::new(3, 1, Decimal::new(3333, 2)),
            ]
        );
        assert_settles(&balances, &plan);
    }

    #[test]
    fn test_many_members_settle_without_self_payment() {
        let members: BTreeSet<i64> = (1..=8).collect();
        let expenses: Vec<Expense<i64>> = (0..25)
            .map(|i| Expense::new(1 + (i * 3) % 8, Decimal::new(2500 + i * 113, 2)))
            .collect();

        let balances = compute_net_balances(&members, &expenses).unwrap();
        let plan = simplify_debts(&balances);

        assert!(plan.len() < members.len());
        for (member, left) in residual_balances(&balances, &plan) {
            // rounding residue is bounded by half a cent per participant
            assert!(left.abs() <= Decimal::new(5, 3) * dec(8), "{} left {}", member, left);
        }
        assert!(plan.iter().all(|s| s.from != s.to));
    }
}
