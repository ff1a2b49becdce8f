//! Asset ledger rules.
//!
//! This module implements the pure side of the balance and points ledgers:
//! - Mutation kinds as closed enums with income/expense classification
//! - The mutation validator and signed delta arithmetic
//! - Points expiry computation
//! - Record listing filters and time-window parsing
//! - Error types for ledger operations

pub mod error;
pub mod expiry;
pub mod filter;
pub mod types;
pub mod validation;

#[cfg(test)]
mod expiry_props;
#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use expiry::{compute_expire_time, days_until_expiry, expires_within, expiry_horizon, is_expired};
pub use filter::{RecordFilter, parse_time_range};
pub use types::{
    AssetInfo, AssetKind, BalanceChangeType, BalanceMutation, ChangeType, FlowDirection,
    PointsChangeType, PointsMutation,
};
pub use validation::{
    ORDER_NO_MAX_LEN, REMARK_MAX_LEN, apply_delta, is_valid_change_type, parse_change_type,
};
