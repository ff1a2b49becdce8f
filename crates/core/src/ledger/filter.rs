//! Record listing filters and time-window parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use memberlink_shared::PageRequest;

use super::error::LedgerError;
use super::types::{ChangeType, FlowDirection};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which end of a time window is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// Parses one time bound.
///
/// Accepted: `YYYY-MM-DD HH:MM:SS` (UTC), RFC 3339 and `YYYY-MM-DD`.
/// A date-only end bound covers the whole day.
fn parse_bound(raw: &str, bound: Bound) -> Result<DateTime<Utc>, LedgerError> {
    let raw = raw.trim();

    if let Ok(at) = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT) {
        return Ok(at.and_utc());
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        let time = match bound {
            Bound::Start => NaiveTime::MIN,
            Bound::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
                .ok_or_else(|| LedgerError::InvalidTimeFormat(raw.to_string()))?,
        };
        return Ok(date.and_time(time).and_utc());
    }

    Err(LedgerError::InvalidTimeFormat(raw.to_string()))
}

/// Parses an optional `[start, end]` window. Blank bounds are open.
///
/// # Errors
///
/// Returns `InvalidTimeFormat` for an unparseable bound and
/// `InvalidTimeRange` if start lies after end.
pub fn parse_time_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), LedgerError> {
    let start = start
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_bound(s, Bound::Start))
        .transpose()?;
    let end = end
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_bound(s, Bound::End))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        return Err(LedgerError::InvalidTimeRange);
    }

    Ok((start, end))
}

/// Filter for listing one account's ledger records.
///
/// Listings are always scoped to a single `(tenant_id, user_id)`, ordered
/// newest first and limited to active records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter<T: ChangeType> {
    /// Only records of this kind.
    pub change_type: Option<T>,
    /// Only records whose kind has this direction.
    pub direction: Option<FlowDirection>,
    /// Inclusive lower bound on `created_at`.
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end_time: Option<DateTime<Utc>>,
    /// Page to return.
    pub page: PageRequest,
}

impl<T: ChangeType> Default for RecordFilter<T> {
    fn default() -> Self {
        Self {
            change_type: None,
            direction: None,
            start_time: None,
            end_time: None,
            page: PageRequest::default(),
        }
    }
}

impl<T: ChangeType> RecordFilter<T> {
    /// Creates an unfiltered first page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from raw caller input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMutationType`, `InvalidTimeFormat` or `InvalidTimeRange`.
    pub fn parse(
        change_type: Option<&str>,
        start_time: Option<&str>,
        end_time: Option<&str>,
        page: PageRequest,
    ) -> Result<Self, LedgerError> {
        let change_type = change_type
            .filter(|s| !s.is_empty())
            .map(super::validation::parse_change_type::<T>)
            .transpose()?;
        let (start_time, end_time) = parse_time_range(start_time, end_time)?;

        Ok(Self {
            change_type,
            direction: None,
            start_time,
            end_time,
            page: page.normalized(),
        })
    }

    /// Restricts to one kind.
    #[must_use]
    pub fn with_change_type(mut self, change_type: T) -> Self {
        self.change_type = Some(change_type);
        self
    }

    /// Restricts to income or expense kinds.
    #[must_use]
    pub fn with_direction(mut self, direction: FlowDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Restricts to an inclusive time window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeRange` if both bounds are set and start > end.
    pub fn between(
        mut self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Self, LedgerError> {
        if let (Some(start), Some(end)) = (start_time, end_time)
            && start > end
        {
            return Err(LedgerError::InvalidTimeRange);
        }
        self.start_time = start_time;
        self.end_time = end_time;
        Ok(self)
    }

    /// Selects a page; out-of-range values are normalized.
    #[must_use]
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page.normalized();
        self
    }

    /// The set of kinds a record may have to be listed.
    ///
    /// `None` means any kind. An empty set means the kind and direction
    /// filters contradict each other and nothing can match.
    #[must_use]
    pub fn allowed_types(&self) -> Option<Vec<T>> {
        match (self.change_type, self.direction) {
            (None, None) => None,
            (Some(kind), None) => Some(vec![kind]),
            (None, Some(direction)) => Some(T::with_direction(direction)),
            (Some(kind), Some(direction)) => {
                Some(if kind.direction() == direction {
                    vec![kind]
                } else {
                    Vec::new()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{BalanceChangeType, PointsChangeType};
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("2024-01-15 08:30:00", Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap())]
    #[case("2024-01-15T08:30:00Z", Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap())]
    #[case("2024-01-15T08:30:00+08:00", Utc.with_ymd_and_hms(2024, 1, 15, 0, 30, 0).unwrap())]
    #[case("2024-01-15", Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())]
    fn test_parse_start_formats(#[case] raw: &str, #[case] expected: DateTime<Utc>) {
        let (start, end) = parse_time_range(Some(raw), None).unwrap();
        assert_eq!(start, Some(expected));
        assert_eq!(end, None);
    }

    #[test]
    fn test_parse_rfc3339_with_millis() {
        let (start, _) = parse_time_range(Some("2024-01-15T08:30:00.250Z"), None).unwrap();
        assert_eq!(
            start.unwrap().timestamp_millis(),
            Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0)
                .unwrap()
                .timestamp_millis()
                + 250
        );
    }

    #[test]
    fn test_date_only_end_covers_whole_day() {
        let (_, end) = parse_time_range(None, Some("2024-01-15")).unwrap();
        let end = end.unwrap();
        assert!(end > Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_same_day_window_is_valid() {
        let (start, end) = parse_time_range(Some("2024-01-15"), Some("2024-01-15")).unwrap();
        assert!(start.unwrap() < end.unwrap());
    }

    #[test]
    fn test_blank_bounds_are_open() {
        assert_eq!(parse_time_range(Some(""), Some("  ")).unwrap(), (None, None));
        assert_eq!(parse_time_range(None, None).unwrap(), (None, None));
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2024/01/15")]
    #[case("2024-13-01")]
    fn test_invalid_format(#[case] raw: &str) {
        let err = parse_time_range(Some(raw), None).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTimeFormat(_)));
    }

    #[test]
    fn test_start_after_end_rejected() {
        let err = parse_time_range(Some("2024-02-01"), Some("2024-01-01")).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTimeRange));
    }

    #[test]
    fn test_filter_parse() {
        let filter = RecordFilter::<BalanceChangeType>::parse(
            Some("recharge"),
            Some("2024-01-01"),
            Some("2024-01-31"),
            PageRequest { page: 0, per_page: 500 },
        )
        .unwrap();
        assert_eq!(filter.change_type, Some(BalanceChangeType::Recharge));
        assert_eq!(filter.page, PageRequest { page: 1, per_page: 100 });
        assert!(filter.start_time.is_some());
    }

    #[test]
    fn test_filter_parse_rejects_wrong_ledger_type() {
        let err = RecordFilter::<BalanceChangeType>::parse(
            Some("obtain"),
            None,
            None,
            PageRequest::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidMutationType { .. }));
    }

    #[test]
    fn test_filter_between_rejects_inverted_window() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = RecordFilter::<PointsChangeType>::new()
            .between(Some(start), Some(end))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTimeRange));
    }

    #[test]
    fn test_allowed_types() {
        let filter = RecordFilter::<PointsChangeType>::new();
        assert_eq!(filter.allowed_types(), None);

        let filter = filter.with_direction(FlowDirection::Income);
        assert_eq!(
            filter.allowed_types(),
            Some(vec![PointsChangeType::Obtain, PointsChangeType::Reward])
        );

        let filter = filter.with_change_type(PointsChangeType::Use);
        assert_eq!(filter.allowed_types(), Some(Vec::new()));

        let filter = RecordFilter::<PointsChangeType>::new()
            .with_change_type(PointsChangeType::Expire)
            .with_direction(FlowDirection::Expense);
        assert_eq!(filter.allowed_types(), Some(vec![PointsChangeType::Expire]));
    }
}
