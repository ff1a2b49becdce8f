//! Ledger error types for validation, business-rule and transaction errors.
//!
//! Errors fall in two families that callers must keep apart:
//! rejections (the request itself is wrong or unaffordable) and failures
//! (the system could not complete a request that may well be valid).

use memberlink_shared::{AppError, TenantId, UserId};
use thiserror::Error;

use super::types::AssetKind;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Rejections: validation ==========
    /// The mutation type is not a member of the ledger's fixed set.
    #[error("Invalid {ledger} mutation type: {value}")]
    InvalidMutationType {
        /// Which ledger the type was submitted to.
        ledger: AssetKind,
        /// The rejected raw value.
        value: String,
    },

    /// Delta cannot be zero.
    #[error("Mutation amount cannot be zero")]
    ZeroAmount,

    /// A text field exceeds its column size.
    #[error("Field '{field}' exceeds {max} characters")]
    FieldTooLong {
        /// Field name.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// Expiry days produce a timestamp outside the representable range.
    #[error("Invalid expire days: {0}")]
    InvalidExpireDays(i32),

    /// A time bound could not be parsed.
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// Start of a time window lies after its end.
    #[error("Invalid time range: start is after end")]
    InvalidTimeRange,

    /// User id does not fit the account table's signed key column.
    #[error("User id {0} exceeds the storable range")]
    InvalidUserId(UserId),

    // ========== Rejections: business rules ==========
    /// No account aggregate exists for the tenant/user pair.
    #[error("Account not found: tenant {tenant_id}, user {user_id}")]
    AccountNotFound {
        /// Tenant scope of the lookup.
        tenant_id: TenantId,
        /// Requested user.
        user_id: UserId,
    },

    /// An account aggregate already exists for the tenant/user pair.
    #[error("Account already exists: tenant {tenant_id}, user {user_id}")]
    AccountExists {
        /// Tenant scope.
        tenant_id: TenantId,
        /// User that already has an account.
        user_id: UserId,
    },

    /// Debit would take the balance below zero.
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Balance before the mutation.
        available: i64,
        /// Signed delta that was requested.
        requested: i64,
    },

    /// Debit would take the points below zero.
    #[error("Insufficient points: available {available}, requested {requested}")]
    InsufficientPoints {
        /// Points before the mutation.
        available: i64,
        /// Signed delta that was requested.
        requested: i64,
    },

    /// The resulting total does not fit in a signed 64-bit integer.
    #[error("Mutation overflows the {0} total")]
    AmountOverflow(AssetKind),

    // ========== Failures ==========
    /// The transaction could not be opened, locked, or committed.
    /// Includes lock-wait timeouts.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The audit record insert failed; the whole transaction was rolled back.
    #[error("Failed to write ledger record: {0}")]
    RecordWriteFailed(String),

    /// A read-path query failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMutationType { .. } => "INVALID_MUTATION_TYPE",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::FieldTooLong { .. } => "FIELD_TOO_LONG",
            Self::InvalidExpireDays(_) => "INVALID_EXPIRE_DAYS",
            Self::InvalidTimeFormat(_) => "INVALID_TIME_FORMAT",
            Self::InvalidTimeRange => "INVALID_TIME_RANGE",
            Self::InvalidUserId(_) => "INVALID_USER_ID",
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::AccountExists { .. } => "ACCOUNT_EXISTS",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::TransactionFailed(_) => "TRANSACTION_FAILED",
            Self::RecordWriteFailed(_) => "RECORD_WRITE_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidMutationType { .. }
            | Self::ZeroAmount
            | Self::FieldTooLong { .. }
            | Self::InvalidExpireDays(_)
            | Self::InvalidTimeFormat(_)
            | Self::InvalidTimeRange
            | Self::InvalidUserId(_) => 400,

            // 404 Not Found
            Self::AccountNotFound { .. } => 404,

            // 409 Conflict
            Self::AccountExists { .. } => 409,

            // 422 Unprocessable - business rules
            Self::InsufficientBalance { .. }
            | Self::InsufficientPoints { .. }
            | Self::AmountOverflow(_) => 422,

            // 503 Service Unavailable - may succeed on retry
            Self::TransactionFailed(_) => 503,

            // 500 Internal Server Error
            Self::RecordWriteFailed(_) | Self::Database(_) => 500,
        }
    }

    /// Returns true if the request was rejected by a validation or business
    /// rule. Rejections must not be retried unchanged.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.http_status_code() < 500
    }

    /// Returns true if the same request may succeed when retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionFailed(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InvalidMutationType { .. }
            | LedgerError::ZeroAmount
            | LedgerError::FieldTooLong { .. }
            | LedgerError::InvalidExpireDays(_)
            | LedgerError::InvalidTimeFormat(_)
            | LedgerError::InvalidTimeRange
            | LedgerError::InvalidUserId(_) => Self::Validation(message),
            LedgerError::AccountNotFound { .. } => Self::NotFound(message),
            LedgerError::AccountExists { .. } => Self::Conflict(message),
            LedgerError::InsufficientBalance { .. }
            | LedgerError::InsufficientPoints { .. }
            | LedgerError::AmountOverflow(_) => Self::BusinessRule(message),
            LedgerError::TransactionFailed(_) => Self::Unavailable(message),
            LedgerError::Database(_) => Self::Database(message),
            LedgerError::RecordWriteFailed(_) => Self::Internal(message),
        }
    }
}
