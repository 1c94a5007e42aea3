//! Persistence boundary.
//!
//! Services only see the `AccountRepository` and `TaskRepository` traits. A record that
//! does not exist is reported as `Ok(None)` (or zero affected rows), never as an error,
//! so callers can tell "absent" apart from a failing store.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;

use crate::models::{Account, NewAccount, NewTask, Task};

pub use memory::{MemoryAccountRepository, MemoryTaskRepository};
pub use postgres::{ensure_schema, PgAccountRepository, PgTaskRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique column (account email, task title) already holds the value.
    UniqueViolation(String),
    /// Any other failure of the underlying store.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::UniqueViolation(msg) => write!(f, "unique violation: {}", msg),
            StoreError::Backend(msg) => write!(f, "store failure: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UniqueViolation(db.message().to_string())
            }
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks, ordered by id.
    async fn find_all(&self) -> Result<Vec<Task>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, StoreError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Task>, StoreError>;

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Overwrites the fields of an existing task. `None` when no task has that id.
    async fn update(&self, id: i64, task: NewTask) -> Result<Option<Task>, StoreError>;

    /// Returns the number of rows removed.
    async fn delete_by_id(&self, id: i64) -> Result<u64, StoreError>;
}
