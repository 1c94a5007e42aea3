use crate::{
    error::AppError,
    models::{Account, LoginRequest, RegisterRequest},
    services::AccountService,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

/// Body returned by `POST /account`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountCreated {
    pub message: String,
    pub account: Account,
}

/// Body returned by a successful `POST /login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    /// Bearer token for the `Authorization` header, valid for 24 hours.
    pub token: String,
    pub account: Account,
}

/// Register a new account
///
/// Responds `201 Created` with the account (never its password), or `400` when the
/// email lacks `@`, the password is shorter than 6 characters, or the email is taken.
#[post("/account")]
pub async fn register(
    service: web::Data<AccountService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let account = service.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(AccountCreated {
        message: "Account has been created".to_string(),
        account,
    }))
}

/// Log in
///
/// Responds `200 OK` with a bearer token, or `401` with the reason the login failed.
#[post("/login")]
pub async fn login(
    service: web::Data<AccountService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let (token, account) = service.login(login_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Logged In".to_string(),
        token,
        account,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenKeys;
    use crate::store::MemoryAccountRepository;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;

    fn account_service() -> web::Data<AccountService> {
        web::Data::new(AccountService::new(
            Arc::new(MemoryAccountRepository::new()),
            Arc::new(TokenKeys::new(b"routes-secret")),
            4,
        ))
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let app = test::init_service(
            App::new()
                .app_data(account_service())
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/account")
            .set_json(json!({ "email": "invalid-email", "password": "password123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/account")
            .set_json(json!({ "email": "test@example.com", "password": "short" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/account")
            .set_json(json!({ "email": "test@example.com", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["account"]["email"], "test@example.com");
        assert!(body["account"].get("password").is_none());
    }

    #[actix_rt::test]
    async fn test_login_responses() {
        let service = account_service();
        let app = test::init_service(
            App::new()
                .app_data(service.clone())
                .service(register)
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "nobody@example.com", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Email address not found");

        let req = test::TestRequest::post()
            .uri("/account")
            .set_json(json!({ "email": "a@b.com", "password": "secret1" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "a@b.com", "password": "secret1" }))
            .to_request();
        let response: AuthResponse = test::call_and_read_body_json(&app, req).await;
        assert!(!response.token.is_empty());
        assert_eq!(response.account.email, "a@b.com");
    }
}
