use crate::{error::AppError, models::TaskInput, services::TaskService};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Lists every task.
///
/// Mounted under `/public`, so no token is required.
#[get("/tasks")]
pub async fn list_tasks(service: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    let tasks = service.list().await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves a task by id.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `404 Not Found`: no task with that id.
#[get("/{id}")]
pub async fn get_task(
    service: web::Data<TaskService>,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = service.get(task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Creates a task.
///
/// ## Request Body:
/// - `title`: 3 to 255 characters, unique across tasks (required).
/// - `description`: 5 to 500 characters (required).
/// - `status` (optional): `pending` (default), `in-progress` or `completed`.
///
/// ## Responses:
/// - `201 Created`: the stored task, with its id and timestamps.
/// - `400 Bad Request`: malformed body or field validation failures.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `409 Conflict`: a task with the same title exists.
#[post("/")]
pub async fn create_task(
    service: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = service.create(task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Updates a task. Fields absent from the body keep their current value.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: malformed body, or the merged task fails validation.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `404 Not Found`: no task with that id; checked before the body is even parsed.
/// - `409 Conflict`: the new title belongs to another task.
#[put("/{id}")]
pub async fn update_task(
    service: web::Data<TaskService>,
    task_id: web::Path<i64>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let task = service.update_json(task_id.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by id. `404` when nothing was deleted.
#[delete("/{id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    service.delete(task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully!" })))
}
