#![allow(dead_code)]

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::json;
use std::sync::Arc;

use taskgate::auth::TokenKeys;
use taskgate::routes;
use taskgate::routes::accounts::AuthResponse;
use taskgate::services::{AccountService, TaskService};
use taskgate::store::{MemoryAccountRepository, MemoryTaskRepository};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

/// Full application over in-memory repositories, as `main` wires it.
pub async fn init_app(
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let keys = Arc::new(TokenKeys::new(TEST_SECRET));
    let accounts = web::Data::new(AccountService::new(
        Arc::new(MemoryAccountRepository::new()),
        Arc::clone(&keys),
        4,
    ));
    let tasks = web::Data::new(TaskService::new(Arc::new(MemoryTaskRepository::new())));

    test::init_service(
        App::new()
            .app_data(accounts)
            .app_data(tasks)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(move |cfg| routes::config(cfg, keys)),
    )
    .await
}

/// Registers `email` and logs in, returning the bearer token.
pub async fn register_and_login(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> Result<String, String> {
    let req = test::TestRequest::post()
        .uri("/account")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    if !status.is_success() {
        let body = test::read_body(resp).await;
        return Err(format!(
            "Failed to register. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;
    Ok(auth.token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
