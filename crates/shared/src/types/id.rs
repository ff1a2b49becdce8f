//! Typed IDs for type-safe entity references.
//!
//! Every ledger call takes a `TenantId` explicitly. There is no default
//! tenant: an empty or oversized identifier is rejected at construction, so
//! a `TenantId` in hand is always a usable isolation key.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a tenant identifier (matches the `tenant_id` columns).
pub const TENANT_ID_MAX_LEN: usize = 50;

/// Errors raised when building typed IDs from raw input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Tenant identifier was empty or whitespace only.
    #[error("Tenant id must not be empty")]
    EmptyTenant,

    /// Tenant identifier exceeds the column size.
    #[error("Tenant id exceeds {TENANT_ID_MAX_LEN} characters")]
    TenantTooLong,
}

/// Identifier of the tenant that scopes every balance and points currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or longer than [`TENANT_ID_MAX_LEN`].
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdError::EmptyTenant);
        }
        if trimmed.chars().count() > TENANT_ID_MAX_LEN {
            return Err(IdError::TenantTooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TenantId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TenantId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a member (the owner of an account aggregate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Creates a user id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner value.
    #[must_use]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Returns the id as stored in `BIGINT` columns, or `None` when it is
    /// outside the signed range and therefore cannot exist in storage.
    #[must_use]
    pub fn to_db(self) -> Option<i64> {
        i64::try_from(self.0).ok()
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
