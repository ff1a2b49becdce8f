//! `SeaORM` Entity for member_accounts table.
//!
//! The account aggregate: one row per `(tenant_id, user_id)` holding the
//! materialized balance and points totals.

use memberlink_core::ledger::AssetInfo;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Status;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "member_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tenant_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    pub balance: i64,
    pub points: i64,
    pub status: Status,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::balance_records::Entity")]
    BalanceRecords,
    #[sea_orm(has_many = "super::points_records::Entity")]
    PointsRecords,
}

impl Related<super::balance_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BalanceRecords.def()
    }
}

impl Related<super::points_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointsRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns the current totals as an asset snapshot.
    #[must_use]
    pub fn asset_info(&self) -> AssetInfo {
        AssetInfo::new(self.balance, self.points)
    }

    /// Returns true if the account is not soft-disabled or deleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}
