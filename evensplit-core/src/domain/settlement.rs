//! Net balance and settlement domain models

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Signed net position per member
///
/// Positive means the member should receive money, negative means they owe.
pub type NetBalances<M> = BTreeMap<M, Decimal>;

/// A directed transfer: `from` pays `to` the given amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement<M> {
    #[serde(rename = "from_id")]
    pub from: M,
    #[serde(rename = "to_id")]
    pub to: M,
    pub amount: Decimal,
}

impl<M> Settlement<M> {
    pub fn new(from: M, to: M, amount: Decimal) -> Self {
        Self { from, to, amount }
    }
}
