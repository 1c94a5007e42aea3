//! In-process repositories with the same uniqueness rules as the SQL schema.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{AccountRepository, StoreError, TaskRepository};
use crate::models::{Account, NewAccount, NewTask, Task};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
pub struct MemoryAccountRepository {
    table: RwLock<Table<Account>>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|a| a.email == email).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|a| a.email == account.email) {
            return Err(StoreError::UniqueViolation(format!(
                "email {} already exists",
                account.email
            )));
        }

        let id = table.next_id();
        let stored = Account {
            id,
            email: account.email,
            password: account.password_hash,
            created_at: Utc::now(),
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }
}

#[derive(Default)]
pub struct MemoryTaskRepository {
    table: RwLock<Table<Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_taken(table: &Table<Task>, title: &str, except: Option<i64>) -> bool {
    table
        .rows
        .values()
        .any(|t| t.title == title && Some(t.id) != except)
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Task>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|t| t.title == title).cloned())
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut table = self.table.write().await;
        if title_taken(&table, &task.title, None) {
            return Err(StoreError::UniqueViolation(format!(
                "title {} already exists",
                task.title
            )));
        }

        let id = table.next_id();
        let now = Utc::now();
        let stored = Task {
            id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, task: NewTask) -> Result<Option<Task>, StoreError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if title_taken(&table, &task.title, Some(id)) {
            return Err(StoreError::UniqueViolation(format!(
                "title {} already exists",
                task.title
            )));
        }

        let updated = table.rows.get_mut(&id).map(|stored| {
            stored.title = task.title;
            stored.description = task.description;
            stored.status = task.status;
            stored.updated_at = Utc::now();
            stored.clone()
        });
        Ok(updated)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: "Some description".to_string(),
            status: TaskStatus::Pending,
        }
    }

    #[actix_rt::test]
    async fn test_task_ids_are_sequential_and_listed_in_order() {
        let repo = MemoryTaskRepository::new();
        let first = repo.insert(new_task("First")).await.unwrap();
        let second = repo.insert(new_task("Second")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let titles: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[actix_rt::test]
    async fn test_task_titles_are_unique() {
        let repo = MemoryTaskRepository::new();
        repo.insert(new_task("Same")).await.unwrap();
        let other = repo.insert(new_task("Other")).await.unwrap();

        assert!(matches!(
            repo.insert(new_task("Same")).await,
            Err(StoreError::UniqueViolation(_))
        ));
        assert!(matches!(
            repo.update(other.id, new_task("Same")).await,
            Err(StoreError::UniqueViolation(_))
        ));
        // Keeping its own title is not a conflict.
        assert!(repo.update(other.id, new_task("Other")).await.unwrap().is_some());
    }

    #[actix_rt::test]
    async fn test_absent_rows() {
        let repo = MemoryTaskRepository::new();
        assert!(repo.find_by_id(42).await.unwrap().is_none());
        assert!(repo.update(42, new_task("Nope")).await.unwrap().is_none());
        assert_eq!(repo.delete_by_id(42).await.unwrap(), 0);

        let task = repo.insert(new_task("Here")).await.unwrap();
        assert_eq!(repo.delete_by_id(task.id).await.unwrap(), 1);
        assert_eq!(repo.delete_by_id(task.id).await.unwrap(), 0);
    }

    #[actix_rt::test]
    async fn test_account_emails_are_unique() {
        let repo = MemoryAccountRepository::new();
        let account = NewAccount {
            email: "a@b.com".to_string(),
            password_hash: "digest".to_string(),
        };
        let stored = repo.insert(account.clone()).await.unwrap();
        assert_eq!(stored.id, 1);
        assert_eq!(stored.password, "digest");

        assert!(matches!(
            repo.insert(account).await,
            Err(StoreError::UniqueViolation(_))
        ));
        assert!(repo.find_by_email("a@b.com").await.unwrap().is_some());
        assert!(repo.find_by_email("x@b.com").await.unwrap().is_none());
    }
}
