//! Database layer with `SeaORM` entities, repositories and the ledger service.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The ledger repository contract with `SeaORM` and in-memory backends
//! - The ledger service composing core rules with storage
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod schema;
pub mod service;

pub use repositories::{InMemoryLedgerRepository, LedgerRepository, SeaLedgerRepository};
pub use service::LedgerService;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use kafala_shared::config::DatabaseConfig;

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
