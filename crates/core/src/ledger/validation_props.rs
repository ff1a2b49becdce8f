//! Property-based tests for mutation validation and delta arithmetic.

use proptest::prelude::*;

use super::error::LedgerError;
use super::types::{AssetKind, BalanceChangeType, ChangeType, PointsChangeType};
use super::validation::{apply_delta, parse_change_type, validate_delta};

/// Strategy for a running total that fits comfortably in storage.
fn running_total() -> impl Strategy<Value = i64> {
    0i64..1_000_000_000_000i64
}

/// Strategy for a nonzero delta of either sign.
fn nonzero_delta() -> impl Strategy<Value = i64> {
    prop_oneof![
        (1i64..1_000_000_000_000i64),
        (1i64..1_000_000_000_000i64).prop_map(|v| -v),
    ]
}

fn asset_kind_strategy() -> impl Strategy<Value = AssetKind> {
    prop_oneof![Just(AssetKind::Balance), Just(AssetKind::Points)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* accepted delta, the new total is exactly `current + delta`
    /// and is never negative.
    #[test]
    fn prop_accepted_delta_is_exact_and_non_negative(
        kind in asset_kind_strategy(),
        current in running_total(),
        delta in nonzero_delta(),
    ) {
        if let Ok(next) = apply_delta(kind, current, delta) {
            prop_assert_eq!(next, current + delta);
            prop_assert!(next >= 0);
        }
    }

    /// *For any* debit larger than the total, the mutation is refused with
    /// the insufficiency error of the right ledger.
    #[test]
    fn prop_overdraw_rejected(
        kind in asset_kind_strategy(),
        current in running_total(),
        excess in 1i64..1_000_000i64,
    ) {
        let delta = -(current + excess);
        let result = apply_delta(kind, current, delta);
        match kind {
            AssetKind::Balance => prop_assert!(
                matches!(result, Err(LedgerError::InsufficientBalance { available, requested })
                    if available == current && requested == delta),
                "got {:?}", result
            ),
            AssetKind::Points => prop_assert!(
                matches!(result, Err(LedgerError::InsufficientPoints { available, requested })
                    if available == current && requested == delta),
                "got {:?}", result
            ),
        }
    }

    /// *For any* credit, sufficiency never refuses the mutation.
    #[test]
    fn prop_credit_always_accepted(
        kind in asset_kind_strategy(),
        current in running_total(),
        credit in 1i64..1_000_000_000_000i64,
    ) {
        prop_assert!(apply_delta(kind, current, credit).is_ok());
    }

    /// *For any* sequence of deltas, folding only the accepted ones keeps the
    /// running total equal to the last accepted snapshot and never below zero.
    #[test]
    fn prop_history_matches_running_total(
        initial in running_total(),
        deltas in prop::collection::vec(nonzero_delta(), 1..40),
    ) {
        let mut total = initial;
        let mut snapshots = Vec::new();
        for delta in deltas {
            if let Ok(next) = apply_delta(AssetKind::Balance, total, delta) {
                total = next;
                snapshots.push(next);
            }
        }
        prop_assert!(total >= 0);
        if let Some(last) = snapshots.last() {
            prop_assert_eq!(*last, total);
        } else {
            prop_assert_eq!(total, initial);
        }
    }

    /// *For any* nonzero delta, the zero check passes.
    #[test]
    fn prop_nonzero_delta_valid(delta in nonzero_delta()) {
        prop_assert!(validate_delta(delta).is_ok());
    }

    /// *For any* string outside the fixed set, parsing is refused.
    #[test]
    fn prop_unknown_type_rejected(raw in "[a-zA-Z_ ]{0,16}") {
        let is_member = BalanceChangeType::ALL.iter().any(|k| k.as_str() == raw);
        let result = parse_change_type::<BalanceChangeType>(&raw);
        prop_assert_eq!(result.is_ok(), is_member);

        let is_member = PointsChangeType::ALL.iter().any(|k| k.as_str() == raw);
        let result = parse_change_type::<PointsChangeType>(&raw);
        prop_assert_eq!(result.is_ok(), is_member);
    }
}
