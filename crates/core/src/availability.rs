//! Availability rules for stays and blocked periods.
//!
//! Every stay and every blocked period is a half-open range of calendar
//! days, `[start, end)`: the `end` day is the departure day and is not
//! occupied. Two ranges `[a, b)` and `[c, d)` overlap iff `a < d && b > c`,
//! so a guest checking out on the 15th never conflicts with a guest checking
//! in on the 15th (the turnover day).
//!
//! The functions here are pure: the same inputs always give the same answer.
//! The site runs them on every submission and every approval, so the public
//! page and the admin console cannot disagree about what "taken" means.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{BlockedDate, Booking};

/// Errors from checking a candidate range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvailabilityError {
    /// The range ends on or before its start.
    #[error("invalid range: {start} is not before {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The range overlaps a busy interval.
    #[error("dates overlap an unavailable period ({conflict})")]
    Unavailable { conflict: DateRange },
}

/// A half-open range of calendar days, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting empty or inverted ones.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidRange`] if `start >= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AvailabilityError> {
        if start >= end {
            return Err(AvailabilityError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether the two ranges share at least one night.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Whether `date` is one of the nights in this range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Number of nights covered.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Whether `[candidate_start, candidate_end)` overlaps any busy interval.
///
/// The caller must have checked `candidate_start < candidate_end`; use
/// [`check_range`] when that is not already known.
#[must_use]
pub fn is_range_unavailable(
    candidate_start: NaiveDate,
    candidate_end: NaiveDate,
    busy_intervals: &[DateRange],
) -> bool {
    first_conflict(candidate_start, candidate_end, busy_intervals).is_some()
}

/// Validates a candidate range and checks it against the busy intervals.
///
/// # Errors
///
/// Returns [`AvailabilityError::InvalidRange`] when `start >= end`, and
/// [`AvailabilityError::Unavailable`] carrying the first overlapping
/// interval when the range is taken.
pub fn check_range(
    start: NaiveDate,
    end: NaiveDate,
    busy_intervals: &[DateRange],
) -> Result<DateRange, AvailabilityError> {
    let candidate = DateRange::new(start, end)?;
    match first_conflict(start, end, busy_intervals) {
        Some(conflict) => Err(AvailabilityError::Unavailable { conflict }),
        None => Ok(candidate),
    }
}

/// Whether a single night falls inside any busy interval.
#[must_use]
pub fn is_date_unavailable(date: NaiveDate, busy_intervals: &[DateRange]) -> bool {
    busy_intervals.iter().any(|busy| busy.contains(date))
}

/// The busy intervals implied by bookings and blocked periods.
///
/// One interval per approved booking and one per blocked period, bookings
/// first, each in input order. Bookings that are not approved are skipped,
/// so an unfiltered list may be passed. Overlapping intervals are not
/// merged.
#[must_use]
pub fn unavailable_intervals(bookings: &[Booking], blocked_dates: &[BlockedDate]) -> Vec<DateRange> {
    bookings
        .iter()
        .filter(|b| b.status.blocks_dates())
        .map(Booking::stay)
        .chain(blocked_dates.iter().map(BlockedDate::period))
        .collect()
}

fn first_conflict(start: NaiveDate, end: NaiveDate, busy_intervals: &[DateRange]) -> Option<DateRange> {
    let candidate = DateRange { start, end };
    busy_intervals
        .iter()
        .find(|busy| candidate.overlaps(busy))
        .copied()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::types::{BlockedDateId, BookingId, BookingStatus, Email};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    fn booking(id: i32, check_in: &str, check_out: &str, status: BookingStatus) -> Booking {
        Booking {
            id: BookingId::new(id),
            guest_name: "Guest".to_string(),
            guest_email: Email::parse("guest@example.no").unwrap(),
            guest_phone: None,
            check_in: date(check_in),
            check_out: date(check_out),
            guests: 2,
            message: None,
            status,
            created_at: Utc::now(),
        }
    }

    fn blocked(id: i32, start: &str, end: &str) -> BlockedDate {
        BlockedDate {
            id: BlockedDateId::new(id),
            start_date: date(start),
            end_date: date(end),
            reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_overlap_matches_half_open_rule_exhaustively() {
        let base = date("2024-01-01");
        let day = |n: i64| base + Duration::days(n);
        for a in 0..6 {
            for b in (a + 1)..7 {
                for c in 0..6 {
                    for d in (c + 1)..7 {
                        let expected = a < d && b > c;
                        let busy = [DateRange::new(day(c), day(d)).unwrap()];
                        assert_eq!(
                            is_range_unavailable(day(a), day(b), &busy),
                            expected,
                            "[{a},{b}) vs [{c},{d})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let busy = [range("2024-06-10", "2024-06-15")];
        assert!(!is_range_unavailable(date("2024-06-15"), date("2024-06-18"), &busy));
        assert!(!is_range_unavailable(date("2024-06-05"), date("2024-06-10"), &busy));
    }

    #[test]
    fn test_turnover_day_scenario() {
        let bookings = [booking(1, "2024-06-10", "2024-06-15", BookingStatus::Approved)];
        let busy = unavailable_intervals(&bookings, &[]);

        assert!(!is_range_unavailable(date("2024-06-15"), date("2024-06-18"), &busy));
        assert!(is_range_unavailable(date("2024-06-14"), date("2024-06-20"), &busy));
    }

    #[test]
    fn test_blocked_period_scenario() {
        let busy = unavailable_intervals(&[], &[blocked(1, "2024-07-01", "2024-07-10")]);
        assert!(is_range_unavailable(date("2024-07-05"), date("2024-07-08"), &busy));
    }

    #[test]
    fn test_enclosing_candidate_is_unavailable() {
        let busy = [range("2024-07-05", "2024-07-06")];
        assert!(is_range_unavailable(date("2024-07-01"), date("2024-07-10"), &busy));
    }

    #[test]
    fn test_no_busy_intervals_means_available() {
        assert!(!is_range_unavailable(date("2024-07-01"), date("2024-07-10"), &[]));
    }

    #[test]
    fn test_unavailable_intervals_only_counts_approved_bookings() {
        let bookings = [
            booking(1, "2024-06-01", "2024-06-05", BookingStatus::Pending),
            booking(2, "2024-06-10", "2024-06-15", BookingStatus::Approved),
            booking(3, "2024-06-20", "2024-06-25", BookingStatus::Denied),
        ];
        let blocks = [
            blocked(1, "2024-07-01", "2024-07-10"),
            blocked(2, "2024-07-05", "2024-07-12"),
        ];

        let busy = unavailable_intervals(&bookings, &blocks);
        assert_eq!(
            busy,
            vec![
                range("2024-06-10", "2024-06-15"),
                range("2024-07-01", "2024-07-10"),
                range("2024-07-05", "2024-07-12"),
            ]
        );
    }

    #[test]
    fn test_check_range_reports_invalid_and_conflicting_ranges() {
        let busy = [range("2024-06-10", "2024-06-15")];

        assert!(matches!(
            check_range(date("2024-06-12"), date("2024-06-12"), &busy),
            Err(AvailabilityError::InvalidRange { .. })
        ));
        assert_eq!(
            check_range(date("2024-06-14"), date("2024-06-20"), &busy),
            Err(AvailabilityError::Unavailable { conflict: busy[0] })
        );
        assert_eq!(
            check_range(date("2024-06-15"), date("2024-06-20"), &busy).unwrap(),
            range("2024-06-15", "2024-06-20")
        );
    }

    #[test]
    fn test_is_date_unavailable_excludes_departure_day() {
        let busy = [range("2024-06-10", "2024-06-15")];
        assert!(is_date_unavailable(date("2024-06-10"), &busy));
        assert!(is_date_unavailable(date("2024-06-14"), &busy));
        assert!(!is_date_unavailable(date("2024-06-15"), &busy));
        assert!(!is_date_unavailable(date("2024-06-09"), &busy));
    }

    #[test]
    fn test_date_range_serializes_as_start_end() {
        let json = serde_json::to_value(range("2024-07-01", "2024-07-10")).unwrap();
        assert_eq!(json, serde_json::json!({"start": "2024-07-01", "end": "2024-07-10"}));
    }

    #[test]
    fn test_nights() {
        assert_eq!(range("2024-02-27", "2024-03-02").nights(), 4);
    }
}
