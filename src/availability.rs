//! Professor availability normalization.
//!
//! Raw availability arrives as administrative entries that frequently
//! touch, overlap, or leave short gaps between them. Normalization folds
//! them into the minimal set of windows per day so that slot generation
//! never sees a spurious boundary.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};
use crate::time::{ClockTime, Weekday};

/// Gap (in minutes) up to which two same-day windows are treated as one.
pub const MERGE_TOLERANCE_MINUTES: u16 = 15;

/// A weekly window during which a professor can teach.
///
/// Invariant: `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct AvailabilityWindow {
    day: Weekday,
    start: ClockTime,
    end: ClockTime,
}

#[derive(Deserialize)]
struct RawWindow {
    day: Weekday,
    start: ClockTime,
    end: ClockTime,
}

impl TryFrom<RawWindow> for AvailabilityWindow {
    type Error = TimetableError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        Self::new(raw.day, raw.start, raw.end)
    }
}

impl AvailabilityWindow {
    /// Creates a window, rejecting empty or inverted ranges.
    pub fn new(day: Weekday, start: ClockTime, end: ClockTime) -> Result<Self> {
        if end <= start {
            return Err(TimetableError::format(format!(
                "availability window on {day:?} ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { day, start, end })
    }

    /// Parses a window from `"HH:MM"` time strings.
    pub fn parse(day: Weekday, start: &str, end: &str) -> Result<Self> {
        Self::new(day, ClockTime::parse(start)?, ClockTime::parse(end)?)
    }

    #[inline]
    pub fn day(&self) -> Weekday {
        self.day
    }

    #[inline]
    pub fn start(&self) -> ClockTime {
        self.start
    }

    #[inline]
    pub fn end(&self) -> ClockTime {
        self.end
    }

    /// Window length in minutes.
    #[inline]
    pub fn length_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }
}

/// Merges windows into the minimal sorted set per day.
///
/// Windows are sorted by `(day, start)`. A window whose start lies within
/// [`MERGE_TOLERANCE_MINUTES`] of the previous same-day window's end (or
/// overlaps it) extends that window; otherwise it opens a new one.
///
/// The result is sorted, pairwise disjoint, separated by more than the
/// tolerance, and normalizing it again returns it unchanged.
pub fn normalize_windows(windows: &[AvailabilityWindow]) -> Vec<AvailabilityWindow> {
    let mut sorted = windows.to_vec();
    sorted.sort_by_key(|w| (w.day, w.start, w.end));

    let mut merged: Vec<AvailabilityWindow> = Vec::with_capacity(sorted.len());
    for window in sorted {
        match merged.last_mut() {
            Some(last)
                if last.day == window.day
                    && window.start.minutes()
                        <= last.end.minutes() + MERGE_TOLERANCE_MINUTES =>
            {
                last.end = last.end.max(window.end);
            }
            _ => merged.push(window),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn w(day: u8, start: &str, end: &str) -> AvailabilityWindow {
        AvailabilityWindow::parse(Weekday::from_index(day).unwrap(), start, end).unwrap()
    }

    #[test]
    fn test_rejects_inverted_window() {
        assert!(AvailabilityWindow::parse(Weekday::Monday, "10:00", "09:00").is_err());
        assert!(AvailabilityWindow::parse(Weekday::Monday, "10:00", "10:00").is_err());
        assert!(AvailabilityWindow::parse(Weekday::Monday, "10:00", "ten").is_err());
    }

    #[test]
    fn test_merge_overlapping_and_touching() {
        let merged = normalize_windows(&[
            w(1, "10:00", "12:00"),
            w(1, "08:00", "10:00"),
            w(1, "11:00", "11:30"),
        ]);
        assert_eq!(merged, vec![w(1, "08:00", "12:00")]);
    }

    #[test]
    fn test_merge_within_tolerance() {
        let merged = normalize_windows(&[w(2, "08:00", "10:00"), w(2, "10:15", "11:00")]);
        assert_eq!(merged, vec![w(2, "08:00", "11:00")]);
    }

    #[test]
    fn test_gap_beyond_tolerance_kept() {
        let merged = normalize_windows(&[w(2, "08:00", "10:00"), w(2, "10:16", "11:00")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_days_never_merge() {
        let merged = normalize_windows(&[w(3, "08:00", "10:00"), w(2, "10:00", "12:00")]);
        assert_eq!(merged, vec![w(2, "10:00", "12:00"), w(3, "08:00", "10:00")]);
    }

    #[test]
    fn test_serde_validates_window() {
        let ok: AvailabilityWindow =
            serde_json::from_str(r#"{"day":0,"start":"08:00","end":"09:30"}"#).unwrap();
        assert_eq!(ok.length_minutes(), 90);
        assert!(serde_json::from_str::<AvailabilityWindow>(
            r#"{"day":0,"start":"09:30","end":"08:00"}"#
        )
        .is_err());
    }

    fn arb_window() -> impl Strategy<Value = AvailabilityWindow> {
        (0u8..7, 0u16..1400, 1u16..240).prop_map(|(d, s, len)| {
            let end = (s + len).min(1439);
            AvailabilityWindow::new(
                Weekday::from_index(d).unwrap(),
                ClockTime::from_minutes(s).unwrap(),
                ClockTime::from_minutes(end.max(s + 1)).unwrap(),
            )
            .unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_normalized_is_sorted_and_disjoint(windows in prop::collection::vec(arb_window(), 0..20)) {
            let merged = normalize_windows(&windows);
            for pair in merged.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!((a.day, a.start) < (b.day, b.start));
                if a.day == b.day {
                    prop_assert!(b.start.minutes() > a.end.minutes() + MERGE_TOLERANCE_MINUTES);
                }
            }
        }

        #[test]
        fn prop_normalize_is_idempotent(windows in prop::collection::vec(arb_window(), 0..20)) {
            let once = normalize_windows(&windows);
            prop_assert_eq!(normalize_windows(&once), once);
        }

        #[test]
        fn prop_normalize_covers_every_input(windows in prop::collection::vec(arb_window(), 0..20)) {
            let merged = normalize_windows(&windows);
            for w in &windows {
                prop_assert!(merged.iter().any(|m| m.day == w.day && m.start <= w.start && m.end >= w.end));
            }
        }
    }
}
