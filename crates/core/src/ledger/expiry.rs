//! Points expiry computation.
//!
//! Expiry is informational: nothing here reclaims points. A scheduled job
//! outside the ledger reads the expired records and posts an `expire`
//! mutation with a negative quantity.

use chrono::{DateTime, TimeDelta, Utc};

use super::error::LedgerError;

/// Computes the expiry time for points granted at `now`.
///
/// `expire_days <= 0` means the points never expire.
///
/// # Errors
///
/// Returns `InvalidExpireDays` if the result is not representable.
pub fn compute_expire_time(
    now: DateTime<Utc>,
    expire_days: i32,
) -> Result<Option<DateTime<Utc>>, LedgerError> {
    if expire_days <= 0 {
        return Ok(None);
    }

    TimeDelta::try_days(i64::from(expire_days))
        .and_then(|delta| now.checked_add_signed(delta))
        .map(Some)
        .ok_or(LedgerError::InvalidExpireDays(expire_days))
}

/// Returns true if the record carries an expiry time that lies before `now`.
#[must_use]
pub fn is_expired(expire_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expire_time.is_some_and(|at| at < now)
}

/// Whole days left until expiry.
///
/// `None` means the points never expire; `Some(0)` means they already have
/// (or will within the day).
#[must_use]
pub fn days_until_expiry(expire_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    expire_time.map(|at| (at - now).num_days().max(0))
}

/// Returns true if the expiry time falls inside `[now, now + within_days]`.
#[must_use]
pub fn expires_within(
    expire_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    within_days: u32,
) -> bool {
    let Some(at) = expire_time else {
        return false;
    };
    at >= now && at <= expiry_horizon(now, within_days)
}

/// `now + within_days`, saturating at the latest representable instant.
#[must_use]
pub fn expiry_horizon(now: DateTime<Utc>, within_days: u32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(within_days))
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
