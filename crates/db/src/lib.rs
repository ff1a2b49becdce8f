//! Database layer for the MemberLink asset ledger.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for accounts and ledger records
//! - The schema migration
//! - Repositories for accounts and ledger records
//! - The balance and points ledger services with their transaction guard

pub mod entities;
pub mod lock;
pub mod migration;
pub mod repositories;
pub mod services;

pub use lock::LedgerTransaction;
pub use repositories::{AccountRepository, LedgerRecordRepository};
pub use services::{BalanceLedgerService, PointsLedgerService};

use std::time::Duration;

use memberlink_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(config.sqlx_logging);

    Database::connect(options).await
}
