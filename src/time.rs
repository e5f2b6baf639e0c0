//! Week and clock-time primitives.
//!
//! All scheduling arithmetic happens on whole minutes. A slot on day `d`
//! covering minutes `[s, e)` is placed on a single week axis by
//! [`pack_week_minute`], so one interval representation spans the whole
//! week and orders day-major, then minute-of-day.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Width of the minute field on the packed week axis.
///
/// `MINUTES_PER_DAY` fits in four decimal digits, so day `d` occupies
/// `[(d + 1) * 10_000, (d + 1) * 10_000 + 1440)`.
pub const DAY_STRIDE: i64 = 10_000;

/// Day of the academic week.
///
/// Numbered from Saturday (0) through Friday (6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    Saturday = 0,
    Sunday = 1,
    Monday = 2,
    Tuesday = 3,
    Wednesday = 4,
    Thursday = 5,
    Friday = 6,
}

impl Weekday {
    /// All days in week order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Saturday,
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Day from its index (0 = Saturday).
    pub fn from_index(index: u8) -> Result<Self> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| TimetableError::format(format!("weekday index out of range: {index}")))
    }

    /// Index of this day (0 = Saturday).
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Weekday {
    type Error = TimetableError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_index(value)
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> u8 {
        day.index()
    }
}

/// A wall-clock time expressed as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Creates a clock time from minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(TimetableError::format(format!(
                "minute of day out of range: {minutes}"
            )));
        }
        Ok(Self(minutes))
    }

    /// Creates a clock time from hour and minute.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(TimetableError::format(format!(
                "invalid clock time {hour:02}:{minute:02}"
            )));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Parses `"HH:MM"`, `"HH:MM:SS"` (seconds dropped) or compact `"HHMM"`.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let parsed = NaiveTime::parse_from_str(text, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
            .ok()
            .or_else(|| {
                (text.len() == 4)
                    .then(|| NaiveTime::parse_from_str(text, "%H%M").ok())
                    .flatten()
            })
            .ok_or_else(|| TimetableError::format(format!("malformed time: {text:?}")))?;
        Ok(Self((parsed.hour() * 60 + parsed.minute()) as u16))
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Compact `"HHMM"` form.
    pub fn compact(self) -> String {
        format!("{:02}{:02}", self.0 / 60, self.0 % 60)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> String {
        time.to_string()
    }
}

/// Length of one class meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotDuration(u16);

impl SlotDuration {
    /// Creates a duration of `minutes` (must be positive and under a day).
    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes == 0 || minutes >= MINUTES_PER_DAY {
            return Err(TimetableError::format(format!(
                "slot duration must be within (0, 24h), got {minutes} minutes"
            )));
        }
        Ok(Self(minutes))
    }

    /// Parses an `"hh:mm"` duration.
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = || TimetableError::format(format!("malformed duration: {text:?}"));
        let (hours, minutes) = text.trim().split_once(':').ok_or_else(malformed)?;
        let hours: u16 = hours.parse().map_err(|_| malformed())?;
        let minutes: u16 = minutes.parse().map_err(|_| malformed())?;
        if minutes >= 60 || hours >= 24 {
            return Err(malformed());
        }
        Self::from_minutes(hours * 60 + minutes)
    }

    /// Length in minutes.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for SlotDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for SlotDuration {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SlotDuration> for String {
    fn from(duration: SlotDuration) -> String {
        duration.to_string()
    }
}

/// Packs a day and minute-of-day onto the week axis.
///
/// `(day + 1) * 10_000 + minute`. Ordering on the packed value equals
/// ordering by `(day, minute)`, and same-day differences equal minute
/// differences.
#[inline]
pub fn pack_week_minute(day: Weekday, minute: u16) -> i64 {
    (day.index() as i64 + 1) * DAY_STRIDE + minute as i64
}

/// Inverse of [`pack_week_minute`].
pub fn unpack_week_minute(packed: i64) -> Result<(Weekday, u16)> {
    let day = packed / DAY_STRIDE - 1;
    let minute = packed % DAY_STRIDE;
    if !(0..7).contains(&day) || !(0..MINUTES_PER_DAY as i64).contains(&minute) {
        return Err(TimetableError::format(format!(
            "not a packed week minute: {packed}"
        )));
    }
    Ok((Weekday::from_index(day as u8)?, minute as u16))
}
