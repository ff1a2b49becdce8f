//! Ledger transaction and account row locking.
//!
//! Every balance or points mutation runs inside one [`LedgerTransaction`]:
//! it opens the transaction, takes the exclusive lock on the account
//! aggregate, writes the new total and finally commits or rolls back as a
//! unit.
//!
//! Only the acquisition (transaction start plus row lock) is bounded by the
//! lock timeout. Once the lock is held, the writes and the commit run to
//! completion, so a mutation is never reported as failed after its commit
//! may already have reached the database.
//!
//! # Usage
//!
//! ```ignore
//! use memberlink_db::lock::LedgerTransaction;
//!
//! let (guard, account) =
//!     LedgerTransaction::acquire(&db, &tenant_id, user_id, Duration::from_secs(5)).await?;
//! let outcome = async {
//!     // ... compute, write the total, insert the record through guard.transaction()
//!     Ok(record)
//! }
//! .await;
//! guard.finish(outcome).await
//! ```

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use memberlink_core::ledger::{AssetKind, LedgerError};
use memberlink_shared::{TenantId, UserId};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    EntityTrait, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::{debug, error};

use crate::entities::member_accounts;

/// A database transaction holding (at most) one account row lock.
///
/// Dropping the guard without calling [`commit`](Self::commit) rolls the
/// transaction back, which is also what happens when the caller's future is
/// cancelled or times out mid-mutation.
pub struct LedgerTransaction {
    txn: DatabaseTransaction,
}

impl LedgerTransaction {
    /// Opens a transaction and locks the account aggregate, giving up once
    /// `lock_timeout` has elapsed.
    ///
    /// On expiry the half-open transaction is dropped and rolled back.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, or `TransactionFailed` (retryable) if the
    /// transaction cannot be started or the lock is not obtained in time.
    pub async fn acquire(
        db: &DatabaseConnection,
        tenant_id: &TenantId,
        user_id: UserId,
        lock_timeout: Duration,
    ) -> Result<(Self, member_accounts::Model), LedgerError> {
        within_lock_timeout(lock_timeout, async {
            let guard = Self::begin(db, lock_timeout).await?;
            let account = guard.lock_account(tenant_id, user_id).await?;
            Ok((guard, account))
        })
        .await
    }

    /// Opens a transaction.
    ///
    /// On Postgres the row-lock wait is bounded with `SET LOCAL lock_timeout`,
    /// scoped to this transaction only. SQLite serialises writers itself.
    ///
    /// # Errors
    ///
    /// Returns `TransactionFailed` if the transaction cannot be started.
    pub async fn begin(db: &DatabaseConnection, lock_timeout: Duration) -> Result<Self, LedgerError> {
        let txn = db.begin().await.map_err(transaction_failed)?;

        if txn.get_database_backend() == DbBackend::Postgres {
            txn.execute_unprepared(&lock_timeout_sql(lock_timeout))
                .await
                .map_err(transaction_failed)?;
        }

        Ok(Self { txn })
    }

    /// Returns a reference to the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Selects the account aggregate with an exclusive row lock
    /// (`SELECT ... FOR UPDATE`).
    ///
    /// Blocks while another transaction holds the lock on the same account.
    /// Accounts of other users or tenants never contend.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no aggregate exists for the pair, or
    /// `TransactionFailed` if the lock cannot be acquired.
    pub async fn lock_account(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
    ) -> Result<member_accounts::Model, LedgerError> {
        let not_found = || LedgerError::AccountNotFound {
            tenant_id: tenant_id.clone(),
            user_id,
        };
        let user_key = user_id.to_db().ok_or_else(not_found)?;

        let account = account_lock_query(tenant_id, user_key)
            .one(&self.txn)
            .await
            .map_err(transaction_failed)?
            .ok_or_else(not_found)?;

        debug!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            balance = account.balance,
            points = account.points,
            "Acquired account lock"
        );

        Ok(account)
    }

    /// Writes a new running total onto the locked aggregate.
    ///
    /// # Errors
    ///
    /// Returns `TransactionFailed` if the update fails.
    pub async fn store_total(
        &self,
        account: member_accounts::Model,
        kind: AssetKind,
        total: i64,
        now: DateTime<Utc>,
    ) -> Result<member_accounts::Model, LedgerError> {
        let mut active: member_accounts::ActiveModel = account.into();
        match kind {
            AssetKind::Balance => active.balance = Set(total),
            AssetKind::Points => active.points = Set(total),
        }
        active.updated_at = Set(now.fixed_offset());

        active.update(&self.txn).await.map_err(transaction_failed)
    }

    /// Commits the transaction, releasing the row lock.
    ///
    /// # Errors
    ///
    /// Returns `TransactionFailed` if the commit fails.
    pub async fn commit(self) -> Result<(), LedgerError> {
        self.txn.commit().await.map_err(transaction_failed)
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns `TransactionFailed` if the rollback fails.
    pub async fn rollback(self) -> Result<(), LedgerError> {
        self.txn.rollback().await.map_err(transaction_failed)
    }

    /// Commits on success and rolls back on error.
    ///
    /// The error of the mutation wins over a failed rollback, which is only
    /// logged: the transaction is gone either way.
    ///
    /// # Errors
    ///
    /// Returns the mutation's error, or `TransactionFailed` if the commit fails.
    pub async fn finish<T>(self, outcome: Result<T, LedgerError>) -> Result<T, LedgerError> {
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback().await {
                    error!(error = %rollback_err, "Failed to roll back ledger transaction");
                }
                Err(e)
            }
        }
    }
}

/// Selects one account aggregate with `FOR UPDATE`.
///
/// SQLite has no row locks and drops the clause; its single writer gives
/// the same exclusion.
#[must_use]
pub fn account_lock_query(tenant_id: &TenantId, user_key: i64) -> Select<member_accounts::Entity> {
    member_accounts::Entity::find_by_id((tenant_id.as_str().to_owned(), user_key)).lock_exclusive()
}

/// Runs an acquisition future under the lock timeout.
///
/// On expiry the future is dropped, which drops any transaction it opened.
async fn within_lock_timeout<T, F>(limit: Duration, acquisition: F) -> Result<T, LedgerError>
where
    F: Future<Output = Result<T, LedgerError>>,
{
    tokio::time::timeout(limit, acquisition)
        .await
        .unwrap_or_else(|_| {
            Err(LedgerError::TransactionFailed(format!(
                "account lock not acquired within {} ms",
                limit.as_millis()
            )))
        })
}

/// Builds the statement bounding the row-lock wait for one transaction.
#[must_use]
pub fn lock_timeout_sql(timeout: Duration) -> String {
    format!("SET LOCAL lock_timeout = '{}ms'", timeout.as_millis().max(1))
}

fn transaction_failed(err: DbErr) -> LedgerError {
    LedgerError::TransactionFailed(err.to_string())
}
