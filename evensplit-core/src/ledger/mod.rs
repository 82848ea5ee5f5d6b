//! Ledger engine - net balances and debt simplification
//!
//! Two pure functions make up the engine:
//!
//! - [`compute_net_balances`] turns a member set and an expense list into a
//!   signed balance per member.
//! - [`simplify_debts`] turns those balances into an ordered list of
//!   transfers that settles everyone.
//!
//! Both are generic over the member identifier so the same code serves
//! stored groups (integer ids) and offline JSON snapshots (string ids).

mod balances;
mod simplify;

use rust_decimal::{Decimal, RoundingStrategy};

pub use balances::{compute_net_balances, total_balance};
pub use simplify::{residual_balances, simplify_debts};

use crate::domain::result::{Error, Result};
use crate::domain::{GroupSnapshot, NetBalances, Settlement};

/// Decimal places used for every reported amount
pub const CURRENCY_DP: u32 = 2;

/// Remaining amounts below one cent count as settled
pub const SETTLE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest amount a single expense may carry (fits `DECIMAL(18,2)`)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 2);

/// Round to cents, halves away from zero
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Check that an expense amount is a positive number of cents within range
pub fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation(format!("amount must be positive, got {}", amount)));
    }
    if amount.normalize().scale() > CURRENCY_DP {
        return Err(Error::validation(format!(
            "amount {} has more than {} decimal places",
            amount, CURRENCY_DP
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(Error::validation(format!("amount {} exceeds {}", amount, MAX_AMOUNT)));
    }
    Ok(())
}

impl<M: Ord + Clone + std::fmt::Display> GroupSnapshot<M> {
    /// Reject snapshots carrying amounts a stored expense could not have
    pub fn validate(&self) -> Result<()> {
        self.expenses.iter().try_for_each(|e| validate_amount(e.amount))
    }

    /// Net balance per member for this snapshot
    pub fn net_balances(&self) -> Result<NetBalances<M>> {
        compute_net_balances(&self.members, &self.expenses)
    }

    /// Settlement plan for this snapshot
    pub fn settlements(&self) -> Result<Vec<Settlement<M>>> {
        Ok(simplify_debts(&self.net_balances()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Expense;

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_currency(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
        assert_eq!(round_currency(Decimal::new(1004, 3)), Decimal::new(100, 2));
    }

    #[test]
    fn test_settle_epsilon_is_one_cent() {
        assert_eq!(SETTLE_EPSILON, Decimal::new(1, 2));
    }

    #[test]
    fn test_max_amount_matches_storage_precision() {
        assert_eq!(MAX_AMOUNT, Decimal::new(999_999_999_999_999_999, 2));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(Decimal::new(1050, 2)).is_ok());
        assert!(validate_amount(Decimal::new(10500, 3)).is_ok());
        assert!(validate_amount(MAX_AMOUNT).is_ok());

        for bad in [
            Decimal::ZERO,
            Decimal::from(-10),
            Decimal::new(1005, 3),
            MAX_AMOUNT + Decimal::new(1, 2),
            Decimal::from_str_exact("60000000000000000000000000000").unwrap(),
        ] {
            assert!(
                matches!(validate_amount(bad), Err(Error::Validation(_))),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_snapshot_validate_rejects_negative_amount() {
        let snapshot = GroupSnapshot::new(["a".to_string(), "b".to_string()])
            .with_expense(Expense::new("a".to_string(), Decimal::from(20)))
            .with_expense(Expense::new("a".to_string(), Decimal::from(-10)));

        assert!(matches!(snapshot.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_snapshot_chains_both_steps() {
        let snapshot = GroupSnapshot::new(["ann".to_string(), "ben".to_string()])
            .with_expense(Expense::new("ann".to_string(), Decimal::from(40)));

        let net = snapshot.net_balances().unwrap();
        assert_eq!(net["ann"], Decimal::from(20));
        assert_eq!(net["ben"], Decimal::from(-20));

        let plan = snapshot.settlements().unwrap();
        assert_eq!(plan, vec![Settlement::new("ben".to_string(), "ann".to_string(), Decimal::from(20))]);
    }
}
