//! `SeaORM` Entity for balance_records table.
//!
//! Append-only: rows are inserted by the balance ledger and never updated
//! or deleted by it.

use memberlink_core::ledger::{BalanceChangeType, ChangeType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BalanceType, Status};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "balance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: String,
    pub user_id: i64,
    pub amount: i64,
    #[sea_orm(column_name = "type")]
    pub change_type: BalanceType,
    pub remark: String,
    pub balance_after: i64,
    pub order_no: Option<String>,
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
    pub fn kind(&self) -> BalanceChangeType {
        self.change_type.into()
    }

    /// Returns true for recharge, refund and reward records.
    #[must_use]
    pub fn is_income(&self) -> bool {
        self.kind().is_income()
    }

    /// Returns true for consume and deduct records.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.kind().is_expense()
    }

    /// Human readable label of the mutation kind.
    #[must_use]
    pub fn type_description(&self) -> &'static str {
        self.kind().description()
    }
}
