//! `SeaORM` Entity for points_records table.

use chrono::{DateTime, Utc};
use memberlink_core::ledger::{ChangeType, PointsChangeType, days_until_expiry, is_expired};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PointsType, Status};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "points_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: String,
    pub user_id: i64,
    pub quantity: i64,
    #[sea_orm(column_name = "type")]
    pub change_type: PointsType,
    pub remark: String,
    pub points_after: i64,
    pub order_no: Option<String>,
    pub expire_time: Option<DateTimeWithTimeZone>,
    pub status: Status,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member_accounts::Entity",
        from = "(Column::TenantId, Column::UserId)",
        to = "(super::member_accounts::Column::TenantId, super::member_accounts::Column::UserId)"
    )]
    MemberAccounts,
}

impl Related<super::member_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemberAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns the mutation kind.
    #[must_use]
    pub fn kind(&self) -> PointsChangeType {
        self.change_type.into()
    }

    /// Returns true for obtain and reward records.
    #[must_use]
    pub fn is_income(&self) -> bool {
        self.kind().is_income()
    }

    /// Returns true for use, expire and deduct records.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.kind().is_expense()
    }

    /// Human readable label of the mutation kind.
    #[must_use]
    pub fn type_description(&self) -> &'static str {
        self.kind().description()
    }

    fn expire_time_utc(&self) -> Option<DateTime<Utc>> {
        self.expire_time.map(|at| at.with_timezone(&Utc))
    }

    /// Returns true if the granted points expired before `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.expire_time_utc(), now)
    }

    /// Whole days left until expiry; `None` if the points never expire.
    #[must_use]
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        days_until_expiry(self.expire_time_utc(), now)
    }
}
