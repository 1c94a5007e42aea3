//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the error type every handler and service returns.
//! Each variant maps onto one HTTP status, and `AppError` implements
//! `actix_web::error::ResponseError` so a failed request is always answered with a single
//! JSON body of the form `{"error": "..."}`.
//!
//! Store failures are logged with their detail and surfaced to the client only as a generic
//! retry message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Message returned to clients whenever the store fails for a reason other than absence.
pub const STORE_FAILURE_MESSAGE: &str = "Connection error. Please retry";

/// Message for request bodies that fail to parse or validate.
pub const INVALID_INPUT: &str = "Invalid input";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed, invalid or expired credentials, or a wrong password (HTTP 401).
    Unauthorized(String),
    /// The request could not be understood, e.g. a malformed JSON body (HTTP 400).
    BadRequest(String),
    /// The referenced entity does not exist (HTTP 404).
    NotFound(String),
    /// A uniqueness rule would be violated (HTTP 409).
    Conflict(String),
    /// An unexpected server-side failure, e.g. while hashing or signing (HTTP 500).
    InternalServerError(String),
    /// The persistence layer failed (HTTP 500). The detail is logged, never sent.
    DatabaseError(String),
    /// Field-level validation failures (HTTP 400).
    ValidationError(ValidationErrors),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(errors) => write!(f, "Validation Error: {}", errors),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => response.json(json!({ "error": msg })),
            AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                response.json(json!({ "error": "Internal server error" }))
            }
            AppError::DatabaseError(msg) => {
                log::error!("store error: {}", msg);
                response.json(json!({ "error": STORE_FAILURE_MESSAGE }))
            }
            AppError::ValidationError(errors) => response.json(json!({
                "error": INVALID_INPUT,
                "details": errors
            })),
        }
    }
}

/// Unique-constraint violations become conflicts; everything else is a store failure.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::UniqueViolation(msg) => AppError::Conflict(msg),
            StoreError::Backend(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::ValidationError(errors)
    }
}
