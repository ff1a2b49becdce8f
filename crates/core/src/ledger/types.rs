//! Ledger domain types: mutation kinds, mutation inputs and asset snapshots.
//!
//! Mutation kinds are closed enums. Adding a kind means adding a variant,
//! and every `match` below has to be revisited by the compiler.

use std::fmt;
use std::str::FromStr;

use memberlink_shared::{Cents, TenantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::validation;

/// The two running totals kept on an account aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Monetary balance in the smallest currency unit.
    Balance,
    /// Loyalty points.
    Points,
}

impl AssetKind {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Points => "points",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting classification of a mutation kind.
///
/// Informational only: the sign of the delta decides what happens to the
/// total, never the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Conceptually adds to the total.
    Income,
    /// Conceptually takes from the total.
    Expense,
}

/// Behaviour shared by the balance and points mutation kinds.
pub trait ChangeType: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// The ledger this kind belongs to.
    const LEDGER: AssetKind;

    /// Every member of the kind, in declaration order.
    const ALL: &'static [Self];

    /// Wire and storage name.
    fn as_str(self) -> &'static str;

    /// Reporting classification.
    fn direction(self) -> FlowDirection;

    /// Human readable label.
    fn description(self) -> &'static str;

    /// Returns true for income kinds.
    fn is_income(self) -> bool {
        self.direction() == FlowDirection::Income
    }

    /// Returns true for expense kinds.
    fn is_expense(self) -> bool {
        self.direction() == FlowDirection::Expense
    }

    /// Returns the members with the given direction.
    fn with_direction(direction: FlowDirection) -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|kind| kind.direction() == direction)
            .collect()
    }
}

/// Balance mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceChangeType {
    /// Member tops up the balance.
    Recharge,
    /// Member spends balance.
    Consume,
    /// A previous consumption is paid back.
    Refund,
    /// Balance granted as a reward.
    Reward,
    /// Administrative deduction.
    Deduct,
}

impl ChangeType for BalanceChangeType {
    const LEDGER: AssetKind = AssetKind::Balance;

    const ALL: &'static [Self] = &[
        Self::Recharge,
        Self::Consume,
        Self::Refund,
        Self::Reward,
        Self::Deduct,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Recharge => "recharge",
            Self::Consume => "consume",
            Self::Refund => "refund",
            Self::Reward => "reward",
            Self::Deduct => "deduct",
        }
    }

    fn direction(self) -> FlowDirection {
        match self {
            Self::Recharge | Self::Refund | Self::Reward => FlowDirection::Income,
            Self::Consume | Self::Deduct => FlowDirection::Expense,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Recharge => "Recharge",
            Self::Consume => "Consumption",
            Self::Refund => "Refund",
            Self::Reward => "Reward",
            Self::Deduct => "Deduction",
        }
    }
}

/// Points mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointsChangeType {
    /// Points earned (e.g. from an order or a check-in).
    Obtain,
    /// Points spent.
    Use,
    /// Points reclaimed after their expiry time.
    Expire,
    /// Points granted as a reward.
    Reward,
    /// Administrative deduction.
    Deduct,
}

impl ChangeType for PointsChangeType {
    const LEDGER: AssetKind = AssetKind::Points;

    const ALL: &'static [Self] = &[
        Self::Obtain,
        Self::Use,
        Self::Expire,
        Self::Reward,
        Self::Deduct,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Obtain => "obtain",
            Self::Use => "use",
            Self::Expire => "expire",
            Self::Reward => "reward",
            Self::Deduct => "deduct",
        }
    }

    fn direction(self) -> FlowDirection {
        match self {
            Self::Obtain | Self::Reward => FlowDirection::Income,
            Self::Use | Self::Expire | Self::Deduct => FlowDirection::Expense,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Obtain => "Obtained",
            Self::Use => "Used",
            Self::Expire => "Expired",
            Self::Reward => "Reward",
            Self::Deduct => "Deduction",
        }
    }
}

impl FromStr for BalanceChangeType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validation::parse_change_type(s)
    }
}

impl FromStr for PointsChangeType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validation::parse_change_type(s)
    }
}

impl fmt::Display for BalanceChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PointsChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request to change an account balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceMutation {
    /// Tenant owning the account.
    pub tenant_id: TenantId,
    /// Account owner.
    pub user_id: UserId,
    /// Signed delta in the smallest currency unit.
    pub amount: i64,
    /// Mutation kind.
    pub change_type: BalanceChangeType,
    /// Free-form remark stored on the record.
    pub remark: String,
    /// External correlation id.
    pub order_no: Option<String>,
}

impl BalanceMutation {
    /// Creates a mutation with an empty remark and no order number.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        user_id: UserId,
        amount: i64,
        change_type: BalanceChangeType,
    ) -> Self {
        Self {
            tenant_id,
            user_id,
            amount,
            change_type,
            remark: String::new(),
            order_no: None,
        }
    }

    /// Builds a mutation from raw caller input.
    ///
    /// An empty `order_no` means "no correlation id".
    ///
    /// # Errors
    ///
    /// Returns `InvalidMutationType`, `ZeroAmount` or `FieldTooLong`.
    pub fn parse(
        tenant_id: TenantId,
        user_id: UserId,
        amount: i64,
        change_type: &str,
        remark: &str,
        order_no: &str,
    ) -> Result<Self, LedgerError> {
        let mutation = Self::new(tenant_id, user_id, amount, change_type.parse()?)
            .with_remark(remark)
            .with_order_no(order_no);
        mutation.validate()?;
        Ok(mutation)
    }

    /// Sets the remark.
    #[must_use]
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Sets the order number; blank values clear it.
    #[must_use]
    pub fn with_order_no(mut self, order_no: impl Into<String>) -> Self {
        self.order_no = validation::normalize_order_no(order_no.into());
        self
    }

    /// Checks the delta and field sizes.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAmount` or `FieldTooLong`.
    pub fn validate(&self) -> Result<(), LedgerError> {
        validation::validate_delta(self.amount)?;
        validation::validate_text_fields(&self.remark, self.order_no.as_deref())
    }
}

/// A validated request to change an account's points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsMutation {
    /// Tenant owning the account.
    pub tenant_id: TenantId,
    /// Account owner.
    pub user_id: UserId,
    /// Signed points delta.
    pub quantity: i64,
    /// Mutation kind.
    pub change_type: PointsChangeType,
    /// Free-form remark stored on the record.
    pub remark: String,
    /// External correlation id.
    pub order_no: Option<String>,
    /// Days until the granted points expire; `<= 0` never expires.
    pub expire_days: i32,
}

impl PointsMutation {
    /// Creates a non-expiring mutation with an empty remark and no order number.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        user_id: UserId,
        quantity: i64,
        change_type: PointsChangeType,
    ) -> Self {
        Self {
            tenant_id,
            user_id,
            quantity,
            change_type,
            remark: String::new(),
            order_no: None,
            expire_days: 0,
        }
    }

    /// Builds a mutation from raw caller input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMutationType`, `ZeroAmount` or `FieldTooLong`.
    #[allow(clippy::too_many_arguments)]
    pub fn parse(
        tenant_id: TenantId,
        user_id: UserId,
        quantity: i64,
        change_type: &str,
        remark: &str,
        order_no: &str,
        expire_days: i32,
    ) -> Result<Self, LedgerError> {
        let mutation = Self::new(tenant_id, user_id, quantity, change_type.parse()?)
            .with_remark(remark)
            .with_order_no(order_no)
            .expiring_in(expire_days);
        mutation.validate()?;
        Ok(mutation)
    }

    /// Sets the remark.
    #[must_use]
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Sets the order number; blank values clear it.
    #[must_use]
    pub fn with_order_no(mut self, order_no: impl Into<String>) -> Self {
        self.order_no = validation::normalize_order_no(order_no.into());
        self
    }

    /// Sets the expiry in days.
    #[must_use]
    pub fn expiring_in(mut self, expire_days: i32) -> Self {
        self.expire_days = expire_days;
        self
    }

    /// Checks the delta and field sizes.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAmount` or `FieldTooLong`.
    pub fn validate(&self) -> Result<(), LedgerError> {
        validation::validate_delta(self.quantity)?;
        validation::validate_text_fields(&self.remark, self.order_no.as_deref())
    }
}

/// Snapshot of an account's assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Balance in the smallest currency unit.
    pub balance: i64,
    /// Balance in major units, for display.
    pub balance_display: Decimal,
    /// Points.
    pub points: i64,
}

impl AssetInfo {
    /// Creates a snapshot from the stored totals.
    #[must_use]
    pub fn new(balance: i64, points: i64) -> Self {
        Self {
            balance,
            balance_display: Cents::new(balance).to_major(),
            points,
        }
    }
}
