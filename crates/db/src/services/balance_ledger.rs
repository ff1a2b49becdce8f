//! Balance ledger service.

use std::time::Duration;

use chrono::Utc;
use memberlink_core::ledger::{
    AssetKind, BalanceChangeType, BalanceMutation, LedgerError, RecordFilter, apply_delta,
};
use memberlink_shared::{LedgerConfig, PageResponse, TenantId, UserId};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use super::{read_failed, record_write_failed};
use crate::entities::{balance_records, member_accounts};
use crate::lock::LedgerTransaction;
use crate::repositories::{LedgerRecordRepository, NewBalanceRecord};

/// Mutates member balances and lists their history.
#[derive(Debug, Clone)]
pub struct BalanceLedgerService {
    db: DatabaseConnection,
    records: LedgerRecordRepository,
    lock_timeout: Duration,
}

impl BalanceLedgerService {
    /// Creates a new balance ledger service.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            records: LedgerRecordRepository::new(db.clone()),
            db,
            lock_timeout: config.lock_timeout(),
        }
    }

    /// Applies a signed balance change from raw caller input.
    ///
    /// The type is validated before any transaction is opened. An empty
    /// `order_no` means no correlation id. Two calls with the same
    /// `order_no` produce two records.
    ///
    /// # Errors
    ///
    /// Rejections: `InvalidMutationType`, `ZeroAmount`, `FieldTooLong`,
    /// `AccountNotFound`, `InsufficientBalance`, `AmountOverflow`.
    /// Failures: `TransactionFailed` (retryable), `RecordWriteFailed`.
    pub async fn change_balance(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        amount: i64,
        change_type: &str,
        remark: &str,
        order_no: &str,
    ) -> Result<balance_records::Model, LedgerError> {
        let mutation = BalanceMutation::parse(
            tenant_id.clone(),
            user_id,
            amount,
            change_type,
            remark,
            order_no,
        )
        .inspect_err(|e| {
            warn!(
                tenant_id = %tenant_id,
                user_id = %user_id,
                amount,
                change_type,
                error = %e,
                "Balance mutation rejected"
            );
        })?;

        self.apply(mutation).await
    }

    /// Applies a typed balance mutation.
    ///
    /// # Errors
    ///
    /// Same as [`change_balance`](Self::change_balance), minus type parsing.
    pub async fn apply(
        &self,
        mutation: BalanceMutation,
    ) -> Result<balance_records::Model, LedgerError> {
        let result = match mutation.validate() {
            Ok(()) => self.execute(&mutation).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(record) => info!(
                tenant_id = %mutation.tenant_id,
                user_id = %mutation.user_id,
                amount = mutation.amount,
                change_type = %mutation.change_type,
                balance_after = record.balance_after,
                record_id = %record.id,
                "Balance changed"
            ),
            Err(e) if e.is_rejection() => warn!(
                tenant_id = %mutation.tenant_id,
                user_id = %mutation.user_id,
                amount = mutation.amount,
                change_type = %mutation.change_type,
                error = %e,
                "Balance mutation rejected"
            ),
            Err(e) => error!(
                tenant_id = %mutation.tenant_id,
                user_id = %mutation.user_id,
                amount = mutation.amount,
                error = %e,
                "Failed to change balance"
            ),
        }

        result
    }

    async fn execute(
        &self,
        mutation: &BalanceMutation,
    ) -> Result<balance_records::Model, LedgerError> {
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
        mutation: &BalanceMutation,
    ) -> Result<balance_records::Model, LedgerError> {
        // Sufficiency is checked against the locked row only.
        let user_key = account.user_id;
        let balance_after = apply_delta(AssetKind::Balance, account.balance, mutation.amount)?;

        let now = Utc::now();
        guard
            .store_total(account, AssetKind::Balance, balance_after, now)
            .await?;

        self.records
            .insert_balance_record(
                guard.transaction(),
                NewBalanceRecord {
                    tenant_id: &mutation.tenant_id,
                    user_id: user_key,
                    amount: mutation.amount,
                    change_type: mutation.change_type,
                    remark: &mutation.remark,
                    balance_after,
                    order_no: mutation.order_no.as_deref(),
                    created_at: now,
                },
            )
            .await
            .map_err(record_write_failed)
    }

    /// Lists an account's balance records, newest first, with the total
    /// number of matching records.
    ///
    /// Takes no lock. An account without records (or without an account)
    /// yields an empty page.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn records(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        filter: &RecordFilter<BalanceChangeType>,
    ) -> Result<(Vec<balance_records::Model>, u64), LedgerError> {
        self.records
            .list_balance_records(tenant_id, user_id, filter)
            .await
            .map_err(|e| {
                error!(tenant_id = %tenant_id, user_id = %user_id, error = %e, "Failed to list balance records");
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
        filter: &RecordFilter<BalanceChangeType>,
    ) -> Result<PageResponse<balance_records::Model>, LedgerError> {
        let (records, total) = self.records(tenant_id, user_id, filter).await?;
        Ok(PageResponse::from_request(filter.page.normalized(), records, total))
    }

    /// Finds the balance records posted with an order number, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn records_by_order_no(
        &self,
        tenant_id: &TenantId,
        order_no: &str,
    ) -> Result<Vec<balance_records::Model>, LedgerError> {
        self.records
            .find_balance_records_by_order_no(tenant_id, order_no)
            .await
            .map_err(|e| {
                error!(tenant_id = %tenant_id, order_no, error = %e, "Failed to look up balance records");
                read_failed(e)
            })
    }
}
