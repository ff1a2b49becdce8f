//! Demo data seeder for MemberLink development.
//!
//! Applies pending migrations, then opens a handful of member accounts for
//! the `demo` tenant and posts some balance and points history on them.
//! Accounts that already exist are left untouched, so the seeder can be run
//! repeatedly.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use memberlink_core::ledger::{LedgerError, PointsChangeType, PointsMutation};
use memberlink_db::migration::{Migrator, MigratorTrait};
use memberlink_db::{AccountRepository, BalanceLedgerService, PointsLedgerService};
use memberlink_shared::{AppConfig, TenantId, UserId};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_TENANT: &str = "demo";

/// `(user id, opening balance in cents, opening points)`
const DEMO_MEMBERS: [(u64, i64, i64); 3] = [
    (1001, 50_000, 1_200),
    (1002, 8_800, 300),
    (1003, 0, 0),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memberlink=debug,sea_orm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = memberlink_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    let tenant = TenantId::new(DEMO_TENANT)?;
    let accounts = AccountRepository::new(db.clone());
    let balance = BalanceLedgerService::new(db.clone(), &config.ledger);
    let points = PointsLedgerService::new(db.clone(), &config.ledger);

    for (id, opening_balance, opening_points) in DEMO_MEMBERS {
        let user = UserId::new(id);
        match accounts.open_account(&tenant, user).await {
            Ok(_) => info!(tenant_id = %tenant, user_id = %user, "Opened demo account"),
            Err(LedgerError::AccountExists { .. }) => {
                warn!(tenant_id = %tenant, user_id = %user, "Demo account already exists, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        if opening_balance > 0 {
            let order_no = format!("SEED-{id}");
            balance
                .change_balance(&tenant, user, opening_balance, "recharge", "opening balance", "")
                .await?;
            balance
                .change_balance(
                    &tenant,
                    user,
                    -(opening_balance / 4),
                    "consume",
                    "first purchase",
                    &order_no,
                )
                .await?;
        }
        if opening_points > 0 {
            points
                .change_points(
                    &tenant,
                    user,
                    opening_points,
                    "obtain",
                    "welcome points",
                    "",
                    365,
                )
                .await?;
            let spend = PointsMutation::new(
                tenant.clone(),
                user,
                -(opening_points / 3),
                PointsChangeType::Use,
            )
            .with_remark("redeemed voucher");
            points.apply(spend).await?;
        }

        let info = accounts.asset_info(&tenant, user).await?;
        info!(
            tenant_id = %tenant,
            user_id = %user,
            balance = %info.balance_display,
            points = info.points,
            "Seeded demo account"
        );
    }

    info!(accounts = accounts.count(&tenant).await?, "Seeding complete");
    Ok(())
}
