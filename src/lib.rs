#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "Task CRUD over a relational store, with account registration, login, and"]
#![doc = "bearer-token middleware guarding the task mutation and lookup routes."]
#![doc = "The binary (`main.rs`) loads the configuration, connects the store and serves"]
#![doc = "the routes registered by `routes::config`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
