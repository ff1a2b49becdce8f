//! Account repository for the member account aggregate.
//!
//! Accounts are created with zero totals and are never deleted, only
//! soft-disabled. The totals themselves are written exclusively by the
//! ledger services.

use chrono::Utc;
use memberlink_core::ledger::{AssetInfo, LedgerError};
use memberlink_shared::{TenantId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};

use crate::entities::{member_accounts, sea_orm_active_enums::Status};

/// Repository for member account aggregates.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens an account with zero balance and points.
    ///
    /// # Errors
    ///
    /// Returns `AccountExists` if the tenant already has an account for the
    /// user, or `Database` if the insert fails.
    pub async fn open_account(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
    ) -> Result<member_accounts::Model, LedgerError> {
        let exists = || LedgerError::AccountExists {
            tenant_id: tenant_id.clone(),
            user_id,
        };
        let user_key = user_id
            .to_db()
            .ok_or(LedgerError::InvalidUserId(user_id))?;
        let now = Utc::now().fixed_offset();

        let account = member_accounts::ActiveModel {
            tenant_id: Set(tenant_id.as_str().to_owned()),
            user_id: Set(user_key),
            balance: Set(0),
            points: Set(0),
            status: Set(Status::Active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => exists(),
            _ => database(e),
        })
    }

    /// Finds an account.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn find(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
    ) -> Result<Option<member_accounts::Model>, LedgerError> {
        let Some(user_key) = user_id.to_db() else {
            return Ok(None);
        };

        member_accounts::Entity::find_by_id((tenant_id.as_str().to_owned(), user_key))
            .one(&self.db)
            .await
            .map_err(database)
    }

    /// Gets an account, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `Database`.
    pub async fn get(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
    ) -> Result<member_accounts::Model, LedgerError> {
        self.find(tenant_id, user_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound {
                tenant_id: tenant_id.clone(),
                user_id,
            })
    }

    /// Sets the soft status of an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `Database`.
    pub async fn set_status(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        status: Status,
    ) -> Result<member_accounts::Model, LedgerError> {
        let account = self.get(tenant_id, user_id).await?;

        let mut active: member_accounts::ActiveModel = account.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().fixed_offset());

        active.update(&self.db).await.map_err(database)
    }

    /// Returns the current balance and points of an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `Database`.
    pub async fn asset_info(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
    ) -> Result<AssetInfo, LedgerError> {
        Ok(self.get(tenant_id, user_id).await?.asset_info())
    }

    /// Counts the accounts of a tenant.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn count(&self, tenant_id: &TenantId) -> Result<u64, LedgerError> {
        member_accounts::Entity::find()
            .filter(member_accounts::Column::TenantId.eq(tenant_id.as_str()))
            .count(&self.db)
            .await
            .map_err(database)
    }
}

fn database(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}
