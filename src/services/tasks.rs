use std::sync::Arc;

use crate::error::{AppError, INVALID_INPUT};
use crate::models::{Task, TaskInput};
use crate::store::TaskRepository;

pub const TASK_NOT_FOUND: &str = "Task not found";
pub const TITLE_TAKEN: &str = "A task with this title already exists";

/// CRUD over tasks.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn list(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.tasks.find_all().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Task, AppError> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task, AppError> {
        let new_task = input.into_new_task()?;

        if self.tasks.find_by_title(&new_task.title).await?.is_some() {
            return Err(AppError::Conflict(TITLE_TAKEN.into()));
        }

        let task = self.tasks.insert(new_task).await?;
        log::info!("created task {}", task.id);
        Ok(task)
    }

    /// Looks the task up before touching the input, so an unknown id is always a 404.
    pub async fn update(&self, id: i64, input: TaskInput) -> Result<Task, AppError> {
        let current = self.get(id).await?;
        self.apply_update(current, input).await
    }

    /// Like `update`, but parses the raw JSON body only once the task is known to exist.
    pub async fn update_json(&self, id: i64, body: &[u8]) -> Result<Task, AppError> {
        let current = self.get(id).await?;
        let input: TaskInput = serde_json::from_slice(body).map_err(|e| {
            log::debug!("rejected update body for task {}: {}", id, e);
            AppError::BadRequest(INVALID_INPUT.into())
        })?;
        self.apply_update(current, input).await
    }

    async fn apply_update(&self, current: Task, input: TaskInput) -> Result<Task, AppError> {
        let id = current.id;
        let changes = input.merge_into(&current)?;

        if changes.title != current.title {
            if let Some(other) = self.tasks.find_by_title(&changes.title).await? {
                if other.id != id {
                    return Err(AppError::Conflict(TITLE_TAKEN.into()));
                }
            }
        }

        // `None` here means the task was deleted after the lookup.
        self.tasks
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.tasks.delete_by_id(id).await? == 0 {
            return Err(AppError::NotFound(TASK_NOT_FOUND.into()));
        }
        log::info!("deleted task {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, TaskStatus};
    use crate::store::{MemoryTaskRepository, StoreError};
    use async_trait::async_trait;

    struct FailingTasks;

    #[async_trait]
    impl TaskRepository for FailingTasks {
        async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<Task>, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn find_by_title(&self, _title: &str) -> Result<Option<Task>, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn insert(&self, _task: NewTask) -> Result<Task, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn update(&self, _id: i64, _task: NewTask) -> Result<Option<Task>, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
        async fn delete_by_id(&self, _id: i64) -> Result<u64, StoreError> {
            Err(StoreError::Backend("down".into()))
        }
    }

    fn service() -> TaskService {
        TaskService::new(Arc::new(MemoryTaskRepository::new()))
    }

    fn input(title: &str, description: &str) -> TaskInput {
        TaskInput {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            status: None,
        }
    }

    #[actix_rt::test]
    async fn test_create_and_get() {
        let service = service();
        let task = service
            .create(input("Write docs", "Describe every endpoint"))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);

        let fetched = service.get(task.id).await.unwrap();
        assert_eq!(fetched.title, "Write docs");
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_duplicate_title_conflicts() {
        let service = service();
        service.create(input("Same title", "First one")).await.unwrap();

        match service.create(input("Same title", "Second one")).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, TITLE_TAKEN),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_update_unknown_id_is_not_found_even_with_bad_input() {
        let service = service();
        let bad = TaskInput {
            title: Some("x".to_string()),
            description: None,
            status: Some("bogus".to_string()),
        };
        assert!(matches!(
            service.update(99, bad).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_raw_update_checks_the_id_before_parsing() {
        let service = service();
        let bodies: [&[u8]; 2] = [b"{ not json", br#"{"title":123,"status":["x"]}"#];
        for body in bodies {
            assert!(matches!(
                service.update_json(99, body).await,
                Err(AppError::NotFound(_))
            ));
        }

        let task = service.create(input("Parsed later", "Exists already")).await.unwrap();
        match service.update_json(task.id, b"{ not json").await {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, INVALID_INPUT),
            other => panic!("expected a bad request, got {:?}", other),
        }

        let updated = service
            .update_json(task.id, br#"{"status":"completed"}"#)
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, "Parsed later");
    }

    #[actix_rt::test]
    async fn test_partial_update() {
        let service = service();
        let task = service.create(input("Old Title", "Old Desc")).await.unwrap();

        let updated = service
            .update(
                task.id,
                TaskInput {
                    status: Some("completed".to_string()),
                    ..TaskInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Old Title");
        assert_eq!(updated.status, TaskStatus::Completed);

        assert!(matches!(
            service
                .update(
                    task.id,
                    TaskInput {
                        description: Some("tiny".to_string()),
                        ..TaskInput::default()
                    }
                )
                .await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[actix_rt::test]
    async fn test_update_onto_taken_title_conflicts() {
        let service = service();
        service.create(input("Taken", "Already here")).await.unwrap();
        let task = service.create(input("Mine", "Will be renamed")).await.unwrap();

        assert!(matches!(
            service.update(task.id, input("Taken", "Will be renamed")).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[actix_rt::test]
    async fn test_delete() {
        let service = service();
        let task = service.create(input("Delete me", "Short lived")).await.unwrap();

        service.delete(task.id).await.unwrap();
        assert!(matches!(
            service.delete(task.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.get(task.id).await, Err(AppError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn test_store_failures_are_not_reported_as_absent() {
        let service = TaskService::new(Arc::new(FailingTasks));
        assert!(matches!(service.get(1).await, Err(AppError::DatabaseError(_))));
        assert!(matches!(service.delete(1).await, Err(AppError::DatabaseError(_))));
        assert!(matches!(service.list().await, Err(AppError::DatabaseError(_))));
    }
}
