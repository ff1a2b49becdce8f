//! Points ledger service.
//!
//! Same transactional shape as the balance ledger, on the `points` total,
//! plus expiry computation for granted points. Expiry is query-only: no
//! sweeper reclaims expired points here.

use std::time::Duration;

use chrono::{DateTime, Utc};
use memberlink_core::ledger::{
    AssetKind, LedgerError, PointsChangeType, PointsMutation, RecordFilter, apply_delta,
    compute_expire_time,
};
use memberlink_shared::{LedgerConfig, PageResponse, TenantId, UserId};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use super::{read_failed, record_write_failed};
use crate::entities::{member_accounts, points_records};
use crate::lock::LedgerTransaction;
use crate::repositories::{LedgerRecordRepository, NewPointsRecord};

/// Mutates member points and lists their history.
#[derive(Debug, Clone)]
pub struct PointsLedgerService {
    db: DatabaseConnection,
    records: LedgerRecordRepository,
    lock_timeout: Duration,
}

impl PointsLedgerService {
    /// Creates a new points ledger service.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            records: LedgerRecordRepository::new(db.clone()),
            db,
            lock_timeout: config.lock_timeout(),
        }
    }

    /// Applies a signed points change from raw caller input.
    ///
    /// `expire_days > 0` stamps the record with `created_at + expire_days`;
    /// `expire_days <= 0` means the points never expire.
    ///
    /// # Errors
    ///
    /// Rejections: `InvalidMutationType`, `ZeroAmount`, `FieldTooLong`,
    /// `InvalidExpireDays`, `AccountNotFound`, `InsufficientPoints`,
    /// `AmountOverflow`. Failures: `TransactionFailed` (retryable),
    /// `RecordWriteFailed`.
    #[allow(clippy::too_many_arguments)]
    pub async fn change_points(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        quantity: i64,
        change_type: &str,
        remark: &str,
        order_no: &str,
        expire_days: i32,
    ) -> Result<points_records::Model, LedgerError> {
        let mutation = PointsMutation::parse(
            tenant_id.clone(),
            user_id,
            quantity,
            change_type,
            remark,
            order_no,
            expire_days,
        )
        .inspect_err(|e| {
            warn!(
                tenant_id = %tenant_id,
                user_id = %user_id,
                quantity,
                change_type,
                error = %e,
                "Points mutation rejected"
            );
        })?;

        self.apply(mutation).await
    }

    /// Applies a typed points mutation.
    ///
    /// # Errors
    ///
    /// Same as [`change_points`](Self::change_points), minus type parsing.
    pub async fn apply(&self, mutation: PointsMutation) -> Result<points_records::Model, LedgerError> {
        let result = match Self::validate(&mutation) {
            Ok(()) => self.execute(&mutation).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(record) => info!(
                tenant_id = %mutation.tenant_id,
                user_id = %mutation.user_id,
                quantity = mutation.quantity,
                change_type = %mutation.change_type,
                points_after = record.points_after,
                expire_time = ?record.expire_time,
                record_id = %record.id,
                "Points changed"
            ),
            Err(e) if e.is_rejection() => warn!(
                tenant_id = %mutation.tenant_id,
                user_id = %mutation.user_id,
                quantity = mutation.quantity,
                change_type = %mutation.change_type,
                error = %e,
                "Points mutation rejected"
            ),
            Err(e) => error!(
                tenant_id = %mutation.tenant_id,
                user_id = %mutation.user_id,
                quantity = mutation.quantity,
                error = %e,
                "Failed to change points"
            ),
        }

        result
    }

    /// Checks everything that does not need the account row.
    fn validate(mutation: &PointsMutation) -> Result<(), LedgerError> {
        mutation.validate()?;
        compute_expire_time(Utc::now(), mutation.expire_days).map(|_| ())
    }

    async fn execute(&self, mutation: &PointsMutation) -> Result<points_records::Model, LedgerError> {
        let (guard, account) = LedgerTransaction::acquire(
            &self.db,
            &mutation.tenant_id,
            mutation.user_id,
            self.lock_timeout,
        )
        .await?;
        let outcome = self.post(&guard, account, mutation).await;
        guard.finish(outcome).await
    }

    async fn post(
        &self,
        guard: &LedgerTransaction,
        account: member_accounts::Model,
        mutation: &PointsMutation,
    ) -> Result<points_records::Model, LedgerError> {
        let user_key = account.user_id;
        let points_after = apply_delta(AssetKind::Points, account.points, mutation.quantity)?;

        let now = Utc::now();
        let expire_time = compute_expire_time(now, mutation.expire_days)?;
        guard
            .store_total(account, AssetKind::Points, points_after, now)
            .await?;

        self.records
            .insert_points_record(
                guard.transaction(),
                NewPointsRecord {
                    tenant_id: &mutation.tenant_id,
                    user_id: user_key,
                    quantity: mutation.quantity,
                    change_type: mutation.change_type,
                    remark: &mutation.remark,
                    points_after,
                    order_no: mutation.order_no.as_deref(),
                    expire_time,
                    created_at: now,
                },
            )
            .await
            .map_err(record_write_failed)
    }

    /// Lists an account's points records, newest first, with the total
    /// number of matching records.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn records(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        filter: &RecordFilter<PointsChangeType>,
    ) -> Result<(Vec<points_records::Model>, u64), LedgerError> {
        self.records
            .list_points_records(tenant_id, user_id, filter)
            .await
            .map_err(|e| {
                error!(tenant_id = %tenant_id, user_id = %user_id, error = %e, "Failed to list points records");
                read_failed(e)
            })
    }

    /// Same as [`records`](Self::records), wrapped with page metadata.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn records_page(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        filter: &RecordFilter<PointsChangeType>,
    ) -> Result<PageResponse<points_records::Model>, LedgerError> {
        let (records, total) = self.records(tenant_id, user_id, filter).await?;
        Ok(PageResponse::from_request(filter.page.normalized(), records, total))
    }

    /// Finds the points records posted with an order number, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn records_by_order_no(
        &self,
        tenant_id: &TenantId,
        order_no: &str,
    ) -> Result<Vec<points_records::Model>, LedgerError> {
        self.records
            .find_points_records_by_order_no(tenant_id, order_no)
            .await
            .map_err(|e| {
                error!(tenant_id = %tenant_id, order_no, error = %e, "Failed to look up points records");
                read_failed(e)
            })
    }

    /// Records whose granted points expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn expired_records(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<points_records::Model>, LedgerError> {
        self.records
            .expired_points_records(tenant_id, user_id, now)
            .await
            .map_err(read_failed)
    }

    /// Records whose granted points expire within `within_days` of `now`.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn expiring_records(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        within_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<points_records::Model>, LedgerError> {
        self.records
            .expiring_points_records(tenant_id, user_id, within_days, now)
            .await
            .map_err(read_failed)
    }
}
