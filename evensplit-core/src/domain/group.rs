//! Group domain models

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::expense::{Expense, ExpenseRecord};
use super::user::User;

/// A stored group of users sharing expenses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

impl Group {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A group together with its current members and recorded expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetail {
    pub id: i64,
    pub name: String,
    pub members: Vec<User>,
    pub expenses: Vec<ExpenseRecord>,
}

impl GroupDetail {
    /// The ledger engine's view of this group
    pub fn snapshot(&self) -> GroupSnapshot<i64> {
        GroupSnapshot {
            members: self.members.iter().map(|u| u.id).collect(),
            expenses: self.expenses.iter().map(ExpenseRecord::to_expense).collect(),
        }
    }

    /// Look up a member's display name
    pub fn member_name(&self, id: i64) -> Option<&str> {
        self.members
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.as_str())
    }
}

/// Immutable input to the ledger engine: who is in the group and what was paid
///
/// Members are kept in an ordered set so every computation over the
/// snapshot iterates in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "M: Serialize + Ord",
    deserialize = "M: Deserialize<'de> + Ord"
))]
pub struct GroupSnapshot<M> {
    pub members: BTreeSet<M>,
    #[serde(default)]
    pub expenses: Vec<Expense<M>>,
}

impl<M: Ord> GroupSnapshot<M> {
    pub fn new(members: impl IntoIterator<Item = M>) -> Self {
        Self {
            members: members.into_iter().collect(),
            expenses: Vec::new(),
        }
    }

    pub fn with_expense(mut self, expense: Expense<M>) -> Self {
        self.expenses.push(expense);
        self
    }
}
