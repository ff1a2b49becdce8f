//! Mutation validation and delta arithmetic.
//!
//! Everything here is a pure function. The ledger services call these
//! before opening a transaction (type and field checks) and again after the
//! account row is locked (`apply_delta`), so the sufficiency check always
//! runs against the value that will actually be overwritten.

use super::error::LedgerError;
use super::types::{AssetKind, ChangeType};

/// Maximum remark length (matches the `remark` columns).
pub const REMARK_MAX_LEN: usize = 255;

/// Maximum order number length (matches the `order_no` columns).
pub const ORDER_NO_MAX_LEN: usize = 64;

/// Parses a raw mutation type against the fixed set of `T`.
///
/// Matching is exact: `"Recharge"` is not `"recharge"`.
///
/// # Errors
///
/// Returns `InvalidMutationType` if `raw` names no member of `T`.
pub fn parse_change_type<T: ChangeType>(raw: &str) -> Result<T, LedgerError> {
    T::ALL
        .iter()
        .copied()
        .find(|kind| kind.as_str() == raw)
        .ok_or_else(|| LedgerError::InvalidMutationType {
            ledger: T::LEDGER,
            value: raw.to_string(),
        })
}

/// Returns true if `raw` is a member of `T`.
#[must_use]
pub fn is_valid_change_type<T: ChangeType>(raw: &str) -> bool {
    parse_change_type::<T>(raw).is_ok()
}

/// Rejects a zero delta.
///
/// # Errors
///
/// Returns `ZeroAmount` if `delta == 0`.
pub fn validate_delta(delta: i64) -> Result<(), LedgerError> {
    if delta == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    Ok(())
}

/// Checks remark and order number sizes.
///
/// # Errors
///
/// Returns `FieldTooLong` for the first oversized field.
pub fn validate_text_fields(remark: &str, order_no: Option<&str>) -> Result<(), LedgerError> {
    if remark.chars().count() > REMARK_MAX_LEN {
        return Err(LedgerError::FieldTooLong {
            field: "remark",
            max: REMARK_MAX_LEN,
        });
    }
    if order_no.is_some_and(|no| no.chars().count() > ORDER_NO_MAX_LEN) {
        return Err(LedgerError::FieldTooLong {
            field: "order_no",
            max: ORDER_NO_MAX_LEN,
        });
    }
    Ok(())
}

/// Trims an order number and maps blank input to `None`.
#[must_use]
pub fn normalize_order_no(order_no: String) -> Option<String> {
    let trimmed = order_no.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == order_no.len() {
        Some(order_no)
    } else {
        Some(trimmed.to_string())
    }
}

/// Applies a signed delta to a running total.
///
/// A debit (`delta < 0`) that would leave the total below zero is refused
/// with the kind-specific insufficiency error. Credits are never refused
/// for sufficiency.
///
/// # Errors
///
/// Returns `InsufficientBalance`, `InsufficientPoints` or `AmountOverflow`.
pub fn apply_delta(kind: AssetKind, current: i64, delta: i64) -> Result<i64, LedgerError> {
    let next = current
        .checked_add(delta)
        .ok_or(LedgerError::AmountOverflow(kind))?;

    if delta < 0 && next < 0 {
        return Err(match kind {
            AssetKind::Balance => LedgerError::InsufficientBalance {
                available: current,
                requested: delta,
            },
            AssetKind::Points => LedgerError::InsufficientPoints {
                available: current,
                requested: delta,
            },
        });
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{BalanceChangeType, PointsChangeType};
    use rstest::rstest;

    #[rstest]
    #[case("recharge", BalanceChangeType::Recharge)]
    #[case("consume", BalanceChangeType::Consume)]
    #[case("refund", BalanceChangeType::Refund)]
    #[case("reward", BalanceChangeType::Reward)]
    #[case("deduct", BalanceChangeType::Deduct)]
    fn test_parse_balance_types(#[case] raw: &str, #[case] expected: BalanceChangeType) {
        assert_eq!(parse_change_type::<BalanceChangeType>(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("obtain", PointsChangeType::Obtain)]
    #[case("use", PointsChangeType::Use)]
    #[case("expire", PointsChangeType::Expire)]
    #[case("reward", PointsChangeType::Reward)]
    #[case("deduct", PointsChangeType::Deduct)]
    fn test_parse_points_types(#[case] raw: &str, #[case] expected: PointsChangeType) {
        assert_eq!(parse_change_type::<PointsChangeType>(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("bogus")]
    #[case("Recharge")]
    #[case(" recharge")]
    #[case("obtain")]
    fn test_parse_balance_rejects(#[case] raw: &str) {
        let err = parse_change_type::<BalanceChangeType>(raw).unwrap_err();
        match err {
            LedgerError::InvalidMutationType { ledger, value } => {
                assert_eq!(ledger, AssetKind::Balance);
                assert_eq!(value, raw);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_valid_change_type() {
        assert!(is_valid_change_type::<PointsChangeType>("expire"));
        assert!(!is_valid_change_type::<PointsChangeType>("recharge"));
    }

    #[test]
    fn test_validate_delta() {
        assert!(matches!(validate_delta(0), Err(LedgerError::ZeroAmount)));
        assert!(validate_delta(-1).is_ok());
        assert!(validate_delta(1).is_ok());
    }

    #[test]
    fn test_validate_text_fields() {
        assert!(validate_text_fields("", None).is_ok());
        assert!(validate_text_fields(&"r".repeat(REMARK_MAX_LEN), Some("A1")).is_ok());
        assert!(matches!(
            validate_text_fields(&"r".repeat(REMARK_MAX_LEN + 1), None),
            Err(LedgerError::FieldTooLong { field: "remark", .. })
        ));
        assert!(matches!(
            validate_text_fields("", Some(&"9".repeat(ORDER_NO_MAX_LEN + 1))),
            Err(LedgerError::FieldTooLong {
                field: "order_no",
                ..
            })
        ));
    }

    #[test]
    fn test_remark_length_counts_characters() {
        // 255 multi-byte characters fit even though they exceed 255 bytes.
        let remark = "积".repeat(REMARK_MAX_LEN);
        assert!(validate_text_fields(&remark, None).is_ok());
    }

    #[test]
    fn test_normalize_order_no() {
        assert_eq!(normalize_order_no(String::new()), None);
        assert_eq!(normalize_order_no("   ".into()), None);
        assert_eq!(normalize_order_no(" A1 ".into()), Some("A1".into()));
        assert_eq!(normalize_order_no("A1".into()), Some("A1".into()));
    }

    #[test]
    fn test_apply_delta_credit() {
        assert_eq!(apply_delta(AssetKind::Balance, 10_000, 100).unwrap(), 10_100);
    }

    #[test]
    fn test_apply_delta_debit_to_zero() {
        assert_eq!(apply_delta(AssetKind::Points, 500, -500).unwrap(), 0);
    }

    #[test]
    fn test_apply_delta_insufficient_balance() {
        let err = apply_delta(AssetKind::Balance, 12_000, -20_000).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance {
                available: 12_000,
                requested: -20_000
            }
        ));
    }

    #[test]
    fn test_apply_delta_insufficient_points() {
        let err = apply_delta(AssetKind::Points, 10, -11).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientPoints { .. }));
    }

    #[test]
    fn test_apply_delta_overflow() {
        let err = apply_delta(AssetKind::Balance, i64::MAX, 1).unwrap_err();
        assert!(matches!(err, LedgerError::AmountOverflow(AssetKind::Balance)));
    }
}
