use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use super::field_error;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 255;
pub const DESCRIPTION_MIN: usize = 5;
pub const DESCRIPTION_MAX: usize = 500;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status `{}`", other)),
        }
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a task.
///
/// Every field is optional on the wire: creation requires `title` and `description`,
/// while an update only overwrites the fields that are present.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Validated task fields, ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl TaskInput {
    /// Builds the fields of a new task. Missing status defaults to pending.
    pub fn into_new_task(self) -> Result<NewTask, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.is_none() {
            errors.add("title", field_error("required", "Title is required"));
        }
        if self.description.is_none() {
            errors.add(
                "description",
                field_error("required", "Description is required"),
            );
        }
        let status = parse_status(self.status.as_deref(), TaskStatus::default(), &mut errors);

        let task = NewTask {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status,
        };
        finish(task, errors)
    }

    /// Overlays the present fields onto `current` and validates the result.
    pub fn merge_into(self, current: &Task) -> Result<NewTask, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let status = parse_status(self.status.as_deref(), current.status, &mut errors);

        let task = NewTask {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            status,
        };
        finish(task, errors)
    }
}

impl Validate for NewTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "title", &self.title, TITLE_MIN, TITLE_MAX);
        check_length(
            &mut errors,
            "description",
            &self.description,
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
        );
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn parse_status(
    raw: Option<&str>,
    fallback: TaskStatus,
    errors: &mut ValidationErrors,
) -> TaskStatus {
    match raw.map(str::parse::<TaskStatus>) {
        None => fallback,
        Some(Ok(status)) => status,
        Some(Err(_)) => {
            errors.add(
                "status",
                field_error(
                    "oneof",
                    "Status must be one of: pending, in-progress, completed",
                ),
            );
            fallback
        }
    }
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min || len > max {
        let mut error = field_error("length", "Length is out of bounds");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("value".into(), &len);
        errors.add(field, error);
    }
}

// Runs the length checks; a field already reported as missing keeps only that error.
fn finish(task: NewTask, mut errors: ValidationErrors) -> Result<NewTask, ValidationErrors> {
    if let Err(length_errors) = task.validate() {
        for (field, kind) in length_errors.into_errors() {
            if errors.errors().contains_key(field) {
                continue;
            }
            if let validator::ValidationErrorsKind::Field(list) = kind {
                for error in list {
                    errors.add(field, error);
                }
            }
        }
    }

    if errors.errors().is_empty() {
        Ok(task)
    } else {
        Err(errors)
    }
}
