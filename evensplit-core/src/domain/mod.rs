//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with no I/O or external dependencies.

mod expense;
mod group;
pub mod result;
mod settlement;
mod user;

pub use expense::{Expense, ExpenseRecord, NewExpense};
pub use group::{Group, GroupDetail, GroupSnapshot};
pub use settlement::{NetBalances, Settlement};
pub use user::User;
