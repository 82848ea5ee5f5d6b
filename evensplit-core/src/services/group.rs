//! Group service - users, groups, expenses and the ledger queries over them

use std::collections::BTreeSet;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{ExpenseRecord, Group, GroupDetail, NetBalances, NewExpense, Settlement, User};
use crate::ledger::{compute_net_balances, simplify_debts, validate_amount};
use crate::ports::LedgerRepository;

/// Longest accepted user name
pub const MAX_USER_NAME_LEN: usize = 120;

/// Longest accepted group name
pub const MAX_GROUP_NAME_LEN: usize = 140;

/// Longest accepted expense description
pub const MAX_DESCRIPTION_LEN: usize = 300;

fn validate_name(kind: &str, name: &str, max_len: usize) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{} name required", kind)));
    }
    if trimmed.chars().count() > max_len {
        return Err(Error::validation(format!(
            "{} name longer than {} characters",
            kind, max_len
        )));
    }
    Ok(trimmed.to_string())
}

/// Group service for the shared-expense use cases
///
/// Validates input, talks to the repository and hands group snapshots to
/// the ledger engine. The engine itself never touches storage.
pub struct GroupService {
    repository: Arc<dyn LedgerRepository>,
}

impl GroupService {
    pub fn new(repository: Arc<dyn LedgerRepository>) -> Self {
        Self { repository }
    }

    /// Register a new user
    pub fn create_user(&self, name: &str) -> Result<User> {
        let name = validate_name("user", name, MAX_USER_NAME_LEN)?;
        self.repository.add_user(&name)
    }

    /// All users
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.repository.list_users()
    }

    /// Create a group, optionally with initial members
    ///
    /// Every member id must refer to an existing user; nothing is written
    /// if one does not. Repeated ids are added once.
    pub fn create_group(&self, name: &str, member_ids: &[i64]) -> Result<Group> {
        let name = validate_name("group", name, MAX_GROUP_NAME_LEN)?;

        let unique_ids: BTreeSet<i64> = member_ids.iter().copied().collect();
        for id in &unique_ids {
            self.require_user(*id)?;
        }

        let group = self.repository.add_group(&name)?;
        for id in unique_ids {
            self.repository.add_group_member(group.id, id)?;
        }
        Ok(group)
    }

    /// All groups
    pub fn list_groups(&self) -> Result<Vec<Group>> {
        self.repository.list_groups()
    }

    /// Add a user to a group
    ///
    /// Returns `false` when the user was already a member; that is not an error.
    pub fn add_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        self.require_group(group_id)?;
        self.require_user(user_id)?;
        self.repository.add_group_member(group_id, user_id)
    }

    /// Record an expense paid in full by `payer_id` on behalf of the group
    pub fn add_expense(
        &self,
        group_id: i64,
        payer_id: i64,
        amount: Decimal,
        description: &str,
    ) -> Result<ExpenseRecord> {
        self.require_group(group_id)?;
        validate_amount(amount)?;

        let description = description.trim();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(Error::validation(format!(
                "description longer than {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }

        let members = self.repository.get_group_members(group_id)?;
        if !members.iter().any(|m| m.id == payer_id) {
            return Err(Error::validation("payer not in group"));
        }

        self.repository
            .add_expense(&NewExpense::new(group_id, payer_id, amount, description))
    }

    /// A group with its current members and every recorded expense
    pub fn group_detail(&self, group_id: i64) -> Result<GroupDetail> {
        let group = self.require_group(group_id)?;
        let members = self.repository.get_group_members(group_id)?;
        let expenses = self.repository.get_group_expenses(group_id)?;

        Ok(GroupDetail {
            id: group.id,
            name: group.name,
            members,
            expenses,
        })
    }

    /// Net balance of every current member of the group
    pub fn balances(&self, group_id: i64) -> Result<NetBalances<i64>> {
        let detail = self.group_detail(group_id)?;
        let snapshot = detail.snapshot();
        compute_net_balances(&snapshot.members, &snapshot.expenses)
    }

    /// Transfers that settle the group's current balances
    pub fn settle(&self, group_id: i64) -> Result<Vec<Settlement<i64>>> {
        let net = self.balances(group_id)?;
        Ok(simplify_debts(&net))
    }

    fn require_group(&self, group_id: i64) -> Result<Group> {
        self.repository
            .get_group(group_id)?
            .ok_or_else(|| Error::not_found(format!("group {}", group_id)))
    }

    fn require_user(&self, user_id: i64) -> Result<User> {
        self.repository
            .get_user(user_id)?
            .ok_or_else(|| Error::not_found(format!("user {}", user_id)))
    }
}
