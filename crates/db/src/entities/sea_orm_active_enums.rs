//! `SeaORM` active enums shared by the ledger tables.

use memberlink_core::ledger::{BalanceChangeType, PointsChangeType};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// Soft status carried by accounts and records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Marked deleted by admin tooling; rows are never physically removed.
    #[sea_orm(num_value = -1)]
    Deleted,
    /// Soft-disabled.
    #[sea_orm(num_value = 0)]
    Disabled,
    /// Normal.
    #[sea_orm(num_value = 1)]
    Active,
}

/// Stored form of [`BalanceChangeType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum BalanceType {
    /// Member tops up the balance.
    #[sea_orm(string_value = "recharge")]
    Recharge,
    /// Member spends balance.
    #[sea_orm(string_value = "consume")]
    Consume,
    /// Consumption paid back.
    #[sea_orm(string_value = "refund")]
    Refund,
    /// Balance granted as a reward.
    #[sea_orm(string_value = "reward")]
    Reward,
    /// Administrative deduction.
    #[sea_orm(string_value = "deduct")]
    Deduct,
}

/// Stored form of [`PointsChangeType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PointsType {
    /// Points earned.
    #[sea_orm(string_value = "obtain")]
    Obtain,
    /// Points spent.
    #[sea_orm(string_value = "use")]
    Use,
    /// Points reclaimed after expiry.
    #[sea_orm(string_value = "expire")]
    Expire,
    /// Points granted as a reward.
    #[sea_orm(string_value = "reward")]
    Reward,
    /// Administrative deduction.
    #[sea_orm(string_value = "deduct")]
    Deduct,
}

impl From<BalanceChangeType> for BalanceType {
    fn from(value: BalanceChangeType) -> Self {
        match value {
            BalanceChangeType::Recharge => Self::Recharge,
            BalanceChangeType::Consume => Self::Consume,
            BalanceChangeType::Refund => Self::Refund,
            BalanceChangeType::Reward => Self::Reward,
            BalanceChangeType::Deduct => Self::Deduct,
        }
    }
}

impl From<BalanceType> for BalanceChangeType {
    fn from(value: BalanceType) -> Self {
        match value {
            BalanceType::Recharge => Self::Recharge,
            BalanceType::Consume => Self::Consume,
            BalanceType::Refund => Self::Refund,
            BalanceType::Reward => Self::Reward,
            BalanceType::Deduct => Self::Deduct,
        }
    }
}

impl From<PointsChangeType> for PointsType {
    fn from(value: PointsChangeType) -> Self {
        match value {
            PointsChangeType::Obtain => Self::Obtain,
            PointsChangeType::Use => Self::Use,
            PointsChangeType::Expire => Self::Expire,
            PointsChangeType::Reward => Self::Reward,
            PointsChangeType::Deduct => Self::Deduct,
        }
    }
}

impl From<PointsType> for PointsChangeType {
    fn from(value: PointsType) -> Self {
        match value {
            PointsType::Obtain => Self::Obtain,
            PointsType::Use => Self::Use,
            PointsType::Expire => Self::Expire,
            PointsType::Reward => Self::Reward,
            PointsType::Deduct => Self::Deduct,
        }
    }
}
