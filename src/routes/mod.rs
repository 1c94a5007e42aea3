pub mod accounts;
pub mod health;
pub mod tasks;

use actix_web::web;
use std::sync::Arc;

use crate::auth::{AuthMiddleware, TokenKeys};
use crate::error::{AppError, INVALID_INPUT};
use crate::services::tasks::TASK_NOT_FOUND;

/// Registers every route. Only the `/tasks` scope sits behind the bearer-token middleware.
///
/// The services are expected as `web::Data<AccountService>` and `web::Data<TaskService>`.
pub fn config(cfg: &mut web::ServiceConfig, keys: Arc<TokenKeys>) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(health::health)
        .service(accounts::register)
        .service(accounts::login)
        .service(web::scope("/public").service(tasks::list_tasks))
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::new(keys))
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("rejected request body: {}", err);
        AppError::BadRequest(INVALID_INPUT.into()).into()
    })
}

// Task ids are the only path parameters; anything non-numeric cannot name a task.
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::NotFound(TASK_NOT_FOUND.into()).into())
}
