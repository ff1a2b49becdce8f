//! Shared helpers for ledger integration tests.
//!
//! Every test gets its own in-memory SQLite database with the real schema.
//! The pool holds a single connection, so the database lives exactly as
//! long as the returned handle and concurrent transactions are serialised.

#![allow(dead_code)]

use chrono::Utc;
use memberlink_db::entities::{member_accounts, sea_orm_active_enums::Status};
use memberlink_db::migration::{Migrator, MigratorTrait};
use memberlink_db::{AccountRepository, BalanceLedgerService, PointsLedgerService};
use memberlink_shared::{LedgerConfig, TenantId, UserId};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

/// Opens an isolated, migrated in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Creates a tenant id.
pub fn tenant(name: &str) -> TenantId {
    TenantId::new(name).expect("valid tenant id")
}

/// Inserts an account with the given starting totals.
pub async fn seed_account(
    db: &DatabaseConnection,
    tenant_id: &TenantId,
    user_id: UserId,
    balance: i64,
    points: i64,
) -> member_accounts::Model {
    let now = Utc::now().fixed_offset();
    member_accounts::ActiveModel {
        tenant_id: Set(tenant_id.as_str().to_owned()),
        user_id: Set(user_id.to_db().expect("storable user id")),
        balance: Set(balance),
        points: Set(points),
        status: Set(Status::Active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed account")
}

/// Balance service with default configuration.
pub fn balance_service(db: &DatabaseConnection) -> BalanceLedgerService {
    BalanceLedgerService::new(db.clone(), &LedgerConfig::default())
}

/// Points service with default configuration.
pub fn points_service(db: &DatabaseConnection) -> PointsLedgerService {
    PointsLedgerService::new(db.clone(), &LedgerConfig::default())
}

/// Account repository.
pub fn accounts(db: &DatabaseConnection) -> AccountRepository {
    AccountRepository::new(db.clone())
}
