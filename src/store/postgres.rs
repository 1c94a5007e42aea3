use async_trait::async_trait;
use sqlx::PgPool;

use super::{AccountRepository, StoreError, TaskRepository};
use crate::models::{Account, NewAccount, NewTask, Task};

const TASK_COLUMNS: &str = "id, title, description, status, created_at, updated_at";

/// Creates the enum type and both tables when they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        "DO $$ BEGIN
             CREATE TYPE task_status AS ENUM ('pending', 'in-progress', 'completed');
         EXCEPTION
             WHEN duplicate_object THEN NULL;
         END $$",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS accounts (
             id BIGSERIAL PRIMARY KEY,
             email TEXT NOT NULL UNIQUE,
             password TEXT NOT NULL,
             created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tasks (
             id BIGSERIAL PRIMARY KEY,
             title VARCHAR(255) NOT NULL UNIQUE,
             description VARCHAR(500) NOT NULL,
             status task_status NOT NULL DEFAULT 'pending',
             created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
             updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
         )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, password, created_at FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (email, password) VALUES ($1, $2)
             RETURNING id, email, password, created_at",
        )
        .bind(account.email)
        .bind(account.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }
}

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        let sql = format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS);
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {} FROM tasks WHERE title = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, status) VALUES ($1, $2, $3) RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.title)
            .bind(task.description)
            .bind(task.status)
            .fetch_one(&self.pool)
            .await?;

        Ok(task)
    }

    async fn update(&self, id: i64, task: NewTask) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tasks
             SET title = $1, description = $2, status = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.title)
            .bind(task.description)
            .bind(task.status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
