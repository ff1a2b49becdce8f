//! Ledger record store: append-only balance and points change records.
//!
//! Inserts always run on the caller's transaction, the same one that holds
//! the account lock. Reads take no lock; records are immutable once visible.

use chrono::{DateTime, Utc};
use memberlink_core::ledger::{BalanceChangeType, PointsChangeType, RecordFilter, expiry_horizon};
use memberlink_shared::{PageRequest, TenantId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;

use crate::entities::{
    balance_records, points_records,
    sea_orm_active_enums::{BalanceType, PointsType, Status},
};

/// Input for appending a balance record.
#[derive(Debug, Clone)]
pub struct NewBalanceRecord<'a> {
    /// Tenant owning the account.
    pub tenant_id: &'a TenantId,
    /// Account owner, as stored.
    pub user_id: i64,
    /// Signed delta.
    pub amount: i64,
    /// Mutation kind.
    pub change_type: BalanceChangeType,
    /// Remark.
    pub remark: &'a str,
    /// Balance after the mutation.
    pub balance_after: i64,
    /// External correlation id.
    pub order_no: Option<&'a str>,
    /// Commit-time timestamp shared with the aggregate update.
    pub created_at: DateTime<Utc>,
}

/// Input for appending a points record.
#[derive(Debug, Clone)]
pub struct NewPointsRecord<'a> {
    /// Tenant owning the account.
    pub tenant_id: &'a TenantId,
    /// Account owner, as stored.
    pub user_id: i64,
    /// Signed delta.
    pub quantity: i64,
    /// Mutation kind.
    pub change_type: PointsChangeType,
    /// Remark.
    pub remark: &'a str,
    /// Points after the mutation.
    pub points_after: i64,
    /// External correlation id.
    pub order_no: Option<&'a str>,
    /// Expiry of the granted points, if any.
    pub expire_time: Option<DateTime<Utc>>,
    /// Commit-time timestamp shared with the aggregate update.
    pub created_at: DateTime<Utc>,
}

/// Repository for ledger records.
#[derive(Debug, Clone)]
pub struct LedgerRecordRepository {
    db: DatabaseConnection,
}

impl LedgerRecordRepository {
    /// Creates a new ledger record repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Writes (caller's transaction)
    // ========================================================================

    /// Appends a balance record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_balance_record<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: NewBalanceRecord<'_>,
    ) -> Result<balance_records::Model, DbErr> {
        balance_records::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(input.tenant_id.as_str().to_owned()),
            user_id: Set(input.user_id),
            amount: Set(input.amount),
            change_type: Set(BalanceType::from(input.change_type)),
            remark: Set(input.remark.to_owned()),
            balance_after: Set(input.balance_after),
            order_no: Set(input.order_no.map(str::to_owned)),
            status: Set(Status::Active),
            created_at: Set(input.created_at.fixed_offset()),
        }
        .insert(conn)
        .await
    }

    /// Appends a points record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_points_record<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: NewPointsRecord<'_>,
    ) -> Result<points_records::Model, DbErr> {
        points_records::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(input.tenant_id.as_str().to_owned()),
            user_id: Set(input.user_id),
            quantity: Set(input.quantity),
            change_type: Set(PointsType::from(input.change_type)),
            remark: Set(input.remark.to_owned()),
            points_after: Set(input.points_after),
            order_no: Set(input.order_no.map(str::to_owned)),
            expire_time: Set(input.expire_time.map(|at| at.fixed_offset())),
            status: Set(Status::Active),
            created_at: Set(input.created_at.fixed_offset()),
        }
        .insert(conn)
        .await
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Lists one account's balance records, newest first.
    ///
    /// Returns the requested page and the total number of matching records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_balance_records(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        filter: &RecordFilter<BalanceChangeType>,
    ) -> Result<(Vec<balance_records::Model>, u64), DbErr> {
        let Some(user_key) = user_id.to_db() else {
            return Ok((Vec::new(), 0));
        };

        let mut query = balance_records::Entity::find()
            .filter(balance_records::Column::TenantId.eq(tenant_id.as_str()))
            .filter(balance_records::Column::UserId.eq(user_key))
            .filter(balance_records::Column::Status.eq(Status::Active));

        if let Some(kinds) = filter.allowed_types() {
            query = query.filter(
                balance_records::Column::ChangeType
                    .is_in(kinds.into_iter().map(BalanceType::from)),
            );
        }
        if let Some(start) = filter.start_time {
            query = query.filter(balance_records::Column::CreatedAt.gte(start.fixed_offset()));
        }
        if let Some(end) = filter.end_time {
            query = query.filter(balance_records::Column::CreatedAt.lte(end.fixed_offset()));
        }

        let query = query
            .order_by_desc(balance_records::Column::CreatedAt)
            .order_by_desc(balance_records::Column::Id);

        self.fetch_page(query, filter.page).await
    }

    /// Lists one account's points records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_points_records(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        filter: &RecordFilter<PointsChangeType>,
    ) -> Result<(Vec<points_records::Model>, u64), DbErr> {
        let Some(user_key) = user_id.to_db() else {
            return Ok((Vec::new(), 0));
        };

        let mut query = points_scope(tenant_id, user_key);

        if let Some(kinds) = filter.allowed_types() {
            query = query.filter(
                points_records::Column::ChangeType.is_in(kinds.into_iter().map(PointsType::from)),
            );
        }
        if let Some(start) = filter.start_time {
            query = query.filter(points_records::Column::CreatedAt.gte(start.fixed_offset()));
        }
        if let Some(end) = filter.end_time {
            query = query.filter(points_records::Column::CreatedAt.lte(end.fixed_offset()));
        }

        let query = query
            .order_by_desc(points_records::Column::CreatedAt)
            .order_by_desc(points_records::Column::Id);

        self.fetch_page(query, filter.page).await
    }

    /// Finds the balance records carrying an order number, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_balance_records_by_order_no(
        &self,
        tenant_id: &TenantId,
        order_no: &str,
    ) -> Result<Vec<balance_records::Model>, DbErr> {
        balance_records::Entity::find()
            .filter(balance_records::Column::TenantId.eq(tenant_id.as_str()))
            .filter(balance_records::Column::OrderNo.eq(order_no.trim()))
            .order_by_asc(balance_records::Column::CreatedAt)
            .order_by_asc(balance_records::Column::Id)
            .all(&self.db)
            .await
    }

    /// Finds the points records carrying an order number, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_points_records_by_order_no(
        &self,
        tenant_id: &TenantId,
        order_no: &str,
    ) -> Result<Vec<points_records::Model>, DbErr> {
        points_records::Entity::find()
            .filter(points_records::Column::TenantId.eq(tenant_id.as_str()))
            .filter(points_records::Column::OrderNo.eq(order_no.trim()))
            .order_by_asc(points_records::Column::CreatedAt)
            .order_by_asc(points_records::Column::Id)
            .all(&self.db)
            .await
    }

    /// Points records whose expiry time lies before `now`, soonest expired first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn expired_points_records(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<points_records::Model>, DbErr> {
        let Some(user_key) = user_id.to_db() else {
            return Ok(Vec::new());
        };

        points_scope(tenant_id, user_key)
            .filter(points_records::Column::ExpireTime.is_not_null())
            .filter(points_records::Column::ExpireTime.lt(now.fixed_offset()))
            .order_by_asc(points_records::Column::ExpireTime)
            .order_by_asc(points_records::Column::Id)
            .all(&self.db)
            .await
    }

    /// Points records expiring within `[now, now + within_days]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn expiring_points_records(
        &self,
        tenant_id: &TenantId,
        user_id: UserId,
        within_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<points_records::Model>, DbErr> {
        let Some(user_key) = user_id.to_db() else {
            return Ok(Vec::new());
        };
        let horizon = expiry_horizon(now, within_days);

        points_scope(tenant_id, user_key)
            .filter(
                points_records::Column::ExpireTime
                    .between(now.fixed_offset(), horizon.fixed_offset()),
            )
            .order_by_asc(points_records::Column::ExpireTime)
            .order_by_asc(points_records::Column::Id)
            .all(&self.db)
            .await
    }

    /// Runs a listing query for one page.
    async fn fetch_page<E>(
        &self,
        query: Select<E>,
        page: PageRequest,
    ) -> Result<(Vec<E::Model>, u64), DbErr>
    where
        E: EntityTrait,
        E::Model: Send + Sync + 'static,
    {
        let page = page.normalized();
        let paginator = query.paginate(&self.db, page.limit());

        let total = paginator.num_items().await?;
        let records = paginator.fetch_page(u64::from(page.page - 1)).await?;

        Ok((records, total))
    }
}

/// Active points records of one account.
fn points_scope(tenant_id: &TenantId, user_key: i64) -> Select<points_records::Entity> {
    points_records::Entity::find()
        .filter(points_records::Column::TenantId.eq(tenant_id.as_str()))
        .filter(points_records::Column::UserId.eq(user_key))
        .filter(points_records::Column::Status.eq(Status::Active))
}
