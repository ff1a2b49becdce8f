//! Property-based tests for points expiry.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

use super::expiry::{compute_expire_time, days_until_expiry, is_expired};

/// Strategy for an instant between 2000 and 2100.
fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800i64..4_102_444_800i64)
        .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* positive day count, expiry is exactly that many days after
    /// the grant and strictly later than it.
    #[test]
    fn prop_expiry_is_grant_plus_days(now in instant(), days in 1i32..36_500) {
        let expire = compute_expire_time(now, days).unwrap();
        let expire = expire.unwrap();
        prop_assert_eq!(expire - now, TimeDelta::days(i64::from(days)));
        prop_assert!(expire > now);
        prop_assert!(!is_expired(Some(expire), now));
        prop_assert_eq!(days_until_expiry(Some(expire), now), Some(i64::from(days)));
    }

    /// *For any* non-positive day count, the points never expire.
    #[test]
    fn prop_non_positive_days_never_expire(now in instant(), days in i32::MIN..=0) {
        prop_assert_eq!(compute_expire_time(now, days).unwrap(), None);
    }

    /// *For any* expiry in the past, the record is expired with zero days left.
    #[test]
    fn prop_past_expiry_is_expired(now in instant(), ago in 1i64..10_000_000i64) {
        let expire = now - TimeDelta::seconds(ago);
        prop_assert!(is_expired(Some(expire), now));
        prop_assert_eq!(days_until_expiry(Some(expire), now), Some(0));
    }
}
