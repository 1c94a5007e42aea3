use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use taskgate::auth::TokenKeys;
use taskgate::routes;
use taskgate::services::{AccountService, TaskService};
use taskgate::store::{ensure_schema, PgAccountRepository, PgTaskRepository};
use taskgate::Config;

fn startup_error<E: std::fmt::Display>(context: &str, error: E) -> io::Error {
    log::error!("{}: {}", context, error);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, error))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;
    log::debug!("loaded {:?}", config);

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;
    ensure_schema(&pool)
        .await
        .map_err(|e| startup_error("failed to prepare schema", e))?;
    log::info!("database schema ready");

    // Secret is read exactly once, here.
    let keys = Arc::new(TokenKeys::new(config.jwt_secret.as_bytes()));
    let accounts = web::Data::new(AccountService::new(
        Arc::new(PgAccountRepository::new(pool.clone())),
        Arc::clone(&keys),
        config.bcrypt_cost,
    ));
    let tasks = web::Data::new(TaskService::new(Arc::new(PgTaskRepository::new(pool))));

    log::info!("starting taskgate at {}", config.server_url());
    HttpServer::new(move || {
        let keys = Arc::clone(&keys);
        App::new()
            .app_data(accounts.clone())
            .app_data(tasks.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(move |cfg| routes::config(cfg, keys))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
