//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection, Row};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{ExpenseRecord, Group, NewExpense, User};
use crate::ports::LedgerRepository;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Timestamp layout used when writing and reading TIMESTAMP columns
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::database(format!("Invalid timestamp '{}': {}", raw, e)))
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str_exact(raw).map_err(|e| Error::database(format!("Invalid amount '{}': {}", raw, e)))
}

/// Raw expense row; text columns are converted once the statement is done
struct ExpenseRow {
    id: i64,
    group_id: i64,
    payer_id: i64,
    amount: String,
    description: String,
    created_at: String,
}

impl ExpenseRow {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            group_id: row.get(1)?,
            payer_id: row.get(2)?,
            amount: row.get(3)?,
            description: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<ExpenseRecord> {
        Ok(ExpenseRecord {
            id: self.id,
            group_id: self.group_id,
            payer_id: self.payer_id,
            amount: parse_amount(&self.amount)?,
            description: self.description,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

const SELECT_EXPENSES: &str = "SELECT expense_id, group_id, payer_id, CAST(amount AS VARCHAR),
                                      description, CAST(created_at AS VARCHAR)
                               FROM expenses";

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a file-backed ledger database
    ///
    /// Retries with exponential backoff when the file is locked by another
    /// process, e.g. two CLI invocations racing on the same data directory.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Connection::open(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[evensplit] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error
            .map(anyhow::Error::from)
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Open a throwaway in-memory database
    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        })
    }

    /// Path of the backing file, if any
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run database migrations, returning what was applied
    pub fn run_migrations(&self) -> anyhow::Result<MigrationResult> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let result = MigrationService::new(&conn).run_pending()?;
        Ok(result)
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> anyhow::Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    fn query_expenses(&self, sql: &str, key: i64) -> Result<Vec<ExpenseRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([key], ExpenseRow::from_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;

        rows.into_iter().map(ExpenseRow::into_record).collect()
    }
}

impl LedgerRepository for DuckDbRepository {
    fn add_user(&self, name: &str) -> Result<User> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            "INSERT INTO users (name, created_at) VALUES (?, CAST(? AS TIMESTAMP)) RETURNING user_id",
            params![name, format_timestamp(&Utc::now())],
            |row| row.get(0),
        )?;
        Ok(User::new(id, name))
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT user_id, name FROM users WHERE user_id = ?")?;
        let mut rows = stmt.query_map([id], |row| Ok(User::new(row.get(0)?, row.get::<_, String>(1)?)))?;
        Ok(rows.next().transpose()?)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT user_id, name FROM users ORDER BY user_id")?;
        let users = stmt
            .query_map([], |row| Ok(User::new(row.get(0)?, row.get::<_, String>(1)?)))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn add_group(&self, name: &str) -> Result<Group> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            "INSERT INTO expense_groups (name, created_at) VALUES (?, CAST(? AS TIMESTAMP)) RETURNING group_id",
            params![name, format_timestamp(&Utc::now())],
            |row| row.get(0),
        )?;
        Ok(Group::new(id, name))
    }

    fn get_group(&self, id: i64) -> Result<Option<Group>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT group_id, name FROM expense_groups WHERE group_id = ?")?;
        let mut rows = stmt.query_map([id], |row| Ok(Group::new(row.get(0)?, row.get::<_, String>(1)?)))?;
        Ok(rows.next().transpose()?)
    }

    fn list_groups(&self) -> Result<Vec<Group>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT group_id, name FROM expense_groups ORDER BY group_id")?;
        let groups = stmt
            .query_map([], |row| Ok(Group::new(row.get(0)?, row.get::<_, String>(1)?)))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(groups)
    }

    fn add_group_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO group_members (group_id, user_id, joined_at)
             VALUES (?, ?, CAST(? AS TIMESTAMP))
             ON CONFLICT DO NOTHING",
            params![group_id, user_id, format_timestamp(&Utc::now())],
        )?;
        Ok(inserted > 0)
    }

    fn get_group_members(&self, group_id: i64) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT u.user_id, u.name
             FROM group_members gm
             JOIN users u ON u.user_id = gm.user_id
             WHERE gm.group_id = ?
             ORDER BY u.user_id",
        )?;
        let members = stmt
            .query_map([group_id], |row| Ok(User::new(row.get(0)?, row.get::<_, String>(1)?)))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(members)
    }

    fn add_expense(&self, expense: &NewExpense) -> Result<ExpenseRecord> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            "INSERT INTO expenses (group_id, payer_id, amount, description, created_at)
             VALUES (?, ?, CAST(? AS DECIMAL(18, 2)), ?, CAST(? AS TIMESTAMP))
             RETURNING expense_id",
            params![
                expense.group_id,
                expense.payer_id,
                expense.amount.to_string(),
                expense.description,
                format_timestamp(&expense.created_at),
            ],
            |row| row.get(0),
        )?;
        drop(conn);

        let mut stored = self.query_expenses(&format!("{} WHERE expense_id = ?", SELECT_EXPENSES), id)?;
        stored
            .pop()
            .ok_or_else(|| Error::database(format!("Expense {} vanished after insert", id)))
    }

    fn get_group_expenses(&self, group_id: i64) -> Result<Vec<ExpenseRecord>> {
        self.query_expenses(
            &format!("{} WHERE group_id = ? ORDER BY expense_id", SELECT_EXPENSES),
            group_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> DuckDbRepository {
        let repo = DuckDbRepository::in_memory().unwrap();
        repo.ensure_schema().unwrap();
        repo
    }

    #[test]
    fn test_users_get_sequential_ids() {
        let repo = repo();
        let alice = repo.add_user("Alice").unwrap();
        let bob = repo.add_user("Bob").unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(repo.get_user(2).unwrap(), Some(bob));
        assert_eq!(repo.get_user(99).unwrap(), None);
        assert_eq!(repo.list_users().unwrap().len(), 2);
    }

    #[test]
    fn test_membership_insert_is_idempotent() {
        let repo = repo();
        let user = repo.add_user("Alice").unwrap();
        let group = repo.add_group("Flat").unwrap();

        assert!(repo.add_group_member(group.id, user.id).unwrap());
        assert!(!repo.add_group_member(group.id, user.id).unwrap());
        assert_eq!(repo.get_group_members(group.id).unwrap(), vec![user]);
    }

    #[test]
    fn test_expense_amount_round_trips_exactly() {
        let repo = repo();
        let user = repo.add_user("Alice").unwrap();
        let group = repo.add_group("Flat").unwrap();
        repo.add_group_member(group.id, user.id).unwrap();

        let stored = repo
            .add_expense(&NewExpense::new(group.id, user.id, Decimal::new(1999, 2), "groceries"))
            .unwrap();

        assert_eq!(stored.amount, Decimal::new(1999, 2));
        assert_eq!(stored.description, "groceries");
        assert_eq!(repo.get_group_expenses(group.id).unwrap(), vec![stored]);
    }

    #[test]
    fn test_expenses_are_scoped_to_group() {
        let repo = repo();
        let user = repo.add_user("Alice").unwrap();
        let first = repo.add_group("First").unwrap();
        let second = repo.add_group("Second").unwrap();

        repo.add_expense(&NewExpense::new(first.id, user.id, Decimal::from(10), "")).unwrap();
        repo.add_expense(&NewExpense::new(second.id, user.id, Decimal::from(20), "")).unwrap();
        repo.add_expense(&NewExpense::new(first.id, user.id, Decimal::from(30), "")).unwrap();

        let amounts: Vec<Decimal> = repo
            .get_group_expenses(first.id)
            .unwrap()
            .into_iter()
            .map(|e| e.amount)
            .collect();
        assert_eq!(amounts, vec![Decimal::from(10), Decimal::from(30)]);
    }

    #[test]
    fn test_timestamp_parsing_accepts_whole_seconds() {
        let parsed = parse_timestamp("2026-03-01 12:30:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2026-03-01 12:30:00.000000");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Could not set lock on file"));
        assert!(!is_retryable_error("Catalog Error: Table does not exist"));
    }
}
