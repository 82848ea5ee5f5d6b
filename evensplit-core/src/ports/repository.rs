//! Repository port - storage abstraction for users, groups and expenses

use crate::domain::result::Result;
use crate::domain::{ExpenseRecord, Group, NewExpense, User};

/// Storage for the records that feed the ledger engine
///
/// Implementations (adapters) provide the actual database access. The
/// repository does not enforce business rules such as "payer must be a
/// member"; that is the service layer's job.
pub trait LedgerRepository: Send + Sync {
    // === Users ===

    /// Insert a user and return it with its assigned id
    fn add_user(&self, name: &str) -> Result<User>;

    /// Get a user by id
    fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// Get all users, ordered by id
    fn list_users(&self) -> Result<Vec<User>>;

    // === Groups ===

    /// Insert a group and return it with its assigned id
    fn add_group(&self, name: &str) -> Result<Group>;

    /// Get a group by id
    fn get_group(&self, id: i64) -> Result<Option<Group>>;

    /// Get all groups, ordered by id
    fn list_groups(&self) -> Result<Vec<Group>>;

    /// Add a user to a group; returns false if they were already a member
    fn add_group_member(&self, group_id: i64, user_id: i64) -> Result<bool>;

    /// Current members of a group, ordered by user id
    fn get_group_members(&self, group_id: i64) -> Result<Vec<User>>;

    // === Expenses ===

    /// Record an expense and return the stored record
    fn add_expense(&self, expense: &NewExpense) -> Result<ExpenseRecord>;

    /// All expenses of a group in the order they were recorded
    fn get_group_expenses(&self, group_id: i64) -> Result<Vec<ExpenseRecord>>;
}
