pub mod aggregator;
pub mod db;
pub mod directory;
pub mod error;
pub mod http;
pub mod membership;
pub mod message_log;
pub mod model;
pub mod provisioning;
pub mod registry;
pub mod session;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub use error::{AppResult, Error};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}
