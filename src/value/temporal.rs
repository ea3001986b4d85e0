//! Tick-based date/time values.
//!
//! A tick is 100 nanoseconds; date/times count ticks since
//! 0001-01-01T00:00:00. Calendar math goes through `chrono`.

use std::fmt;

use chrono::{Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub const TICKS_PER_MILLISECOND: i64 = 10_000;
pub const TICKS_PER_SECOND: i64 = 1_000 * TICKS_PER_MILLISECOND;
pub const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;
pub const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;
pub const TICKS_PER_DAY: i64 = 24 * TICKS_PER_HOUR;

/// Ticks of 9999-12-31T23:59:59.9999999
pub const MAX_TICKS: i64 = 3_155_378_975_999_999_999;

/// Whether a date/time is local, UTC, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateTimeKind {
    Unspecified,
    Utc,
    Local,
}

impl DateTimeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DateTimeKind::Unspecified => "Unspecified",
            DateTimeKind::Utc => "Utc",
            DateTimeKind::Local => "Local",
        }
    }
}

/// A duration in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSpan {
    pub ticks: i64,
}

impl TimeSpan {
    pub const ZERO: TimeSpan = TimeSpan { ticks: 0 };

    pub fn from_ticks(ticks: i64) -> Self {
        TimeSpan { ticks }
    }

    /// Fractional units are rounded to the nearest millisecond, the
    /// precision `FromDays`-style constructors carry.
    fn from_units(value: f64, ticks_per_unit: i64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let millis = (value * (ticks_per_unit / TICKS_PER_MILLISECOND) as f64).round();
        let ticks = millis * TICKS_PER_MILLISECOND as f64;
        if ticks.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(TimeSpan {
            ticks: ticks as i64,
        })
    }

    pub fn from_days(days: f64) -> Option<Self> {
        Self::from_units(days, TICKS_PER_DAY)
    }

    pub fn from_hours(hours: f64) -> Option<Self> {
        Self::from_units(hours, TICKS_PER_HOUR)
    }

    pub fn from_minutes(minutes: f64) -> Option<Self> {
        Self::from_units(minutes, TICKS_PER_MINUTE)
    }

    pub fn from_seconds(seconds: f64) -> Option<Self> {
        Self::from_units(seconds, TICKS_PER_SECOND)
    }

    pub fn from_milliseconds(millis: f64) -> Option<Self> {
        Self::from_units(millis, TICKS_PER_MILLISECOND)
    }

    pub fn from_hms(hours: i64, minutes: i64, seconds: i64) -> Option<Self> {
        Self::from_dhms(0, hours, minutes, seconds)
    }

    pub fn from_dhms(days: i64, hours: i64, minutes: i64, seconds: i64) -> Option<Self> {
        let total_seconds = days
            .checked_mul(86_400)?
            .checked_add(hours.checked_mul(3_600)?)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)?;
        Some(TimeSpan {
            ticks: total_seconds.checked_mul(TICKS_PER_SECOND)?,
        })
    }

    pub fn checked_add(self, other: TimeSpan) -> Option<Self> {
        self.ticks.checked_add(other.ticks).map(TimeSpan::from_ticks)
    }

    pub fn checked_sub(self, other: TimeSpan) -> Option<Self> {
        self.ticks.checked_sub(other.ticks).map(TimeSpan::from_ticks)
    }

    pub fn checked_neg(self) -> Option<Self> {
        self.ticks.checked_neg().map(TimeSpan::from_ticks)
    }

    pub fn days(self) -> i32 {
        (self.ticks / TICKS_PER_DAY) as i32
    }

    pub fn hours(self) -> i32 {
        ((self.ticks / TICKS_PER_HOUR) % 24) as i32
    }

    pub fn minutes(self) -> i32 {
        ((self.ticks / TICKS_PER_MINUTE) % 60) as i32
    }

    pub fn seconds(self) -> i32 {
        ((self.ticks / TICKS_PER_SECOND) % 60) as i32
    }

    pub fn milliseconds(self) -> i32 {
        ((self.ticks / TICKS_PER_MILLISECOND) % 1_000) as i32
    }

    pub fn total_days(self) -> f64 {
        self.ticks as f64 / TICKS_PER_DAY as f64
    }

    pub fn total_hours(self) -> f64 {
        self.ticks as f64 / TICKS_PER_HOUR as f64
    }

    pub fn total_minutes(self) -> f64 {
        self.ticks as f64 / TICKS_PER_MINUTE as f64
    }

    pub fn total_seconds(self) -> f64 {
        self.ticks as f64 / TICKS_PER_SECOND as f64
    }

    pub fn total_milliseconds(self) -> f64 {
        self.ticks as f64 / TICKS_PER_MILLISECOND as f64
    }
}

/// A calendar date and time of day, in ticks, with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateTime {
    pub ticks: i64,
    pub kind: DateTimeKind,
}

impl DateTime {
    pub const MIN: DateTime = DateTime {
        ticks: 0,
        kind: DateTimeKind::Unspecified,
    };

    pub const MAX: DateTime = DateTime {
        ticks: MAX_TICKS,
        kind: DateTimeKind::Unspecified,
    };

    /// `None` when `ticks` lies outside 0001-01-01 ..= 9999-12-31.
    pub fn from_ticks(ticks: i64, kind: DateTimeKind) -> Option<Self> {
        (0..=MAX_TICKS)
            .contains(&ticks)
            .then_some(DateTime { ticks, kind })
    }

    pub fn from_naive(value: NaiveDateTime, kind: DateTimeKind) -> Option<Self> {
        Self::from_ticks(naive_to_ticks(value)?, kind)
    }

    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        kind: DateTimeKind,
    ) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        Self::from_naive(NaiveDateTime::new(date, time), kind)
    }

    pub fn now() -> Option<Self> {
        Self::from_naive(Local::now().naive_local(), DateTimeKind::Local)
    }

    pub fn utc_now() -> Option<Self> {
        Self::from_naive(Utc::now().naive_utc(), DateTimeKind::Utc)
    }

    pub fn today() -> Option<Self> {
        Self::now().map(|now| now.date())
    }

    pub fn to_naive(self) -> Option<NaiveDateTime> {
        ticks_to_naive(self.ticks)
    }

    /// Same day at midnight, kind preserved.
    pub fn date(self) -> Self {
        DateTime {
            ticks: self.ticks - self.ticks % TICKS_PER_DAY,
            kind: self.kind,
        }
    }

    pub fn time_of_day(self) -> TimeSpan {
        TimeSpan::from_ticks(self.ticks % TICKS_PER_DAY)
    }

    pub fn checked_add(self, span: TimeSpan) -> Option<Self> {
        Self::from_ticks(self.ticks.checked_add(span.ticks)?, self.kind)
    }

    pub fn checked_sub(self, span: TimeSpan) -> Option<Self> {
        Self::from_ticks(self.ticks.checked_sub(span.ticks)?, self.kind)
    }

    pub fn since(self, other: DateTime) -> TimeSpan {
        TimeSpan::from_ticks(self.ticks - other.ticks)
    }

    /// Adds calendar months, clamping the day to the target month's length.
    pub fn add_months(self, months: i32) -> Option<Self> {
        let naive = self.to_naive()?;
        let shifted = if months >= 0 {
            naive.checked_add_months(Months::new(months.unsigned_abs()))?
        } else {
            naive.checked_sub_months(Months::new(months.unsigned_abs()))?
        };
        Self::from_naive(shifted, self.kind)
    }

    pub fn year(self) -> Option<i32> {
        self.to_naive().map(|n| n.year())
    }

    pub fn month(self) -> Option<i32> {
        self.to_naive().map(|n| n.month() as i32)
    }

    pub fn day(self) -> Option<i32> {
        self.to_naive().map(|n| n.day() as i32)
    }

    pub fn day_of_year(self) -> Option<i32> {
        self.to_naive().map(|n| n.ordinal() as i32)
    }

    pub fn hour(self) -> Option<i32> {
        self.to_naive().map(|n| n.hour() as i32)
    }

    pub fn minute(self) -> Option<i32> {
        self.to_naive().map(|n| n.minute() as i32)
    }

    pub fn second(self) -> Option<i32> {
        self.to_naive().map(|n| n.second() as i32)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            None => write!(f, "{} ticks", self.ticks),
        }
    }
}

/// A clock date/time together with its offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateTimeOffset {
    /// Ticks of the clock (local) date/time
    pub ticks: i64,
    pub offset: TimeSpan,
}

impl DateTimeOffset {
    /// Largest offset from UTC a `DateTimeOffset` may carry.
    pub const MAX_OFFSET: TimeSpan = TimeSpan {
        ticks: 14 * TICKS_PER_HOUR,
    };

    /// `None` unless the clock time is in range, the offset is a whole
    /// number of minutes within `±14:00`, and the UTC instant is in range.
    pub fn new(ticks: i64, offset: TimeSpan) -> Option<Self> {
        let limit = Self::MAX_OFFSET.ticks;
        if offset.ticks % TICKS_PER_MINUTE != 0 || !(-limit..=limit).contains(&offset.ticks) {
            return None;
        }
        DateTime::from_ticks(ticks, DateTimeKind::Unspecified)?;
        let value = DateTimeOffset { ticks, offset };
        DateTime::from_ticks(value.utc_ticks()?, DateTimeKind::Utc)?;
        Some(value)
    }

    pub fn now() -> Option<Self> {
        let now = Local::now();
        let offset = TimeSpan::from_ticks(i64::from(now.offset().local_minus_utc()) * TICKS_PER_SECOND);
        Self::new(naive_to_ticks(now.naive_local())?, offset)
    }

    pub fn utc_now() -> Option<Self> {
        Self::new(naive_to_ticks(Utc::now().naive_utc())?, TimeSpan::ZERO)
    }

    /// Ticks of the UTC instant; `None` for values whose offset pushes
    /// the instant out of `i64` range.
    pub fn utc_ticks(self) -> Option<i64> {
        self.ticks.checked_sub(self.offset.ticks)
    }

    pub fn checked_add(self, span: TimeSpan) -> Option<Self> {
        Self::new(self.ticks.checked_add(span.ticks)?, self.offset)
    }

    pub fn checked_sub(self, span: TimeSpan) -> Option<Self> {
        Self::new(self.ticks.checked_sub(span.ticks)?, self.offset)
    }
}

fn naive_to_ticks(value: NaiveDateTime) -> Option<i64> {
    let days = i64::from(value.date().num_days_from_ce()) - 1;
    let time = value.time();
    let seconds = i64::from(time.num_seconds_from_midnight());
    // leap-second nanos (>= 1e9) are folded into the last tick of the second
    let sub_ticks = i64::from(time.nanosecond().min(999_999_999)) / 100;
    days.checked_mul(TICKS_PER_DAY)?
        .checked_add(seconds * TICKS_PER_SECOND)?
        .checked_add(sub_ticks)
}

fn ticks_to_naive(ticks: i64) -> Option<NaiveDateTime> {
    let days = ticks.div_euclid(TICKS_PER_DAY);
    let rem = ticks.rem_euclid(TICKS_PER_DAY);
    let date = NaiveDate::from_num_days_from_ce_opt(i32::try_from(days + 1).ok()?)?;
    let seconds = (rem / TICKS_PER_SECOND) as u32;
    let nanos = ((rem % TICKS_PER_SECOND) * 100) as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)?;
    Some(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_zero_ticks() {
        let epoch = DateTime::from_ymd_hms(1, 1, 1, 0, 0, 0, DateTimeKind::Utc).unwrap();
        assert_eq!(epoch.ticks, 0);
    }

    #[test]
    fn unix_epoch_ticks() {
        let unix = DateTime::from_ymd_hms(1970, 1, 1, 0, 0, 0, DateTimeKind::Utc).unwrap();
        assert_eq!(unix.ticks, 621_355_968_000_000_000);
    }

    #[test]
    fn ticks_round_trip_through_chrono() {
        let dt = DateTime::from_ymd_hms(2024, 2, 29, 13, 45, 7, DateTimeKind::Local).unwrap();
        let naive = dt.to_naive().unwrap();
        assert_eq!(naive.to_string(), "2024-02-29 13:45:07");
        assert_eq!(DateTime::from_naive(naive, DateTimeKind::Local), Some(dt));
    }

    #[test]
    fn max_value_is_last_tick_of_year_9999() {
        let naive = DateTime::MAX.to_naive().unwrap();
        assert_eq!(naive.year(), 9999);
        assert_eq!(naive.nanosecond(), 999_999_900);
        assert!(DateTime::MAX.checked_add(TimeSpan::from_ticks(1)).is_none());
    }

    #[test]
    fn add_months_clamps_day() {
        let jan31 = DateTime::from_ymd_hms(2023, 1, 31, 0, 0, 0, DateTimeKind::Unspecified).unwrap();
        let feb = jan31.add_months(1).unwrap();
        assert_eq!(feb.day(), Some(28));
        assert_eq!(feb.month(), Some(2));
    }

    #[test]
    fn date_truncates_time_of_day() {
        let dt = DateTime::from_ymd_hms(2020, 6, 1, 12, 30, 0, DateTimeKind::Utc).unwrap();
        assert_eq!(dt.date().hour(), Some(0));
        assert_eq!(dt.time_of_day().ticks, 12 * TICKS_PER_HOUR + 30 * TICKS_PER_MINUTE);
    }

    #[test]
    fn timespan_components() {
        let span = TimeSpan::from_dhms(1, 2, 3, 4).unwrap();
        assert_eq!(span.days(), 1);
        assert_eq!(span.hours(), 2);
        assert_eq!(span.minutes(), 3);
        assert_eq!(span.seconds(), 4);
        assert_eq!(TimeSpan::from_days(1.5).unwrap().total_hours(), 36.0);
    }

    #[test]
    fn offsets_share_an_instant() {
        let noon_utc = DateTimeOffset::new(12 * TICKS_PER_HOUR, TimeSpan::ZERO).unwrap();
        let one_pm_plus_one = DateTimeOffset::new(13 * TICKS_PER_HOUR, TimeSpan::from_ticks(TICKS_PER_HOUR)).unwrap();
        assert_eq!(noon_utc.utc_ticks(), one_pm_plus_one.utc_ticks());
    }

    #[test]
    fn offsets_are_validated() {
        let noon = 12 * TICKS_PER_HOUR + 400 * TICKS_PER_DAY;
        assert!(DateTimeOffset::new(noon, TimeSpan::from_ticks(14 * TICKS_PER_HOUR)).is_some());
        assert!(DateTimeOffset::new(noon, TimeSpan::from_ticks(-14 * TICKS_PER_HOUR)).is_some());
        assert!(DateTimeOffset::new(noon, TimeSpan::from_ticks(15 * TICKS_PER_HOUR)).is_none());
        assert!(DateTimeOffset::new(noon, TimeSpan::from_ticks(TICKS_PER_SECOND)).is_none());
        assert!(DateTimeOffset::new(noon, TimeSpan::from_ticks(i64::MIN)).is_none());
        // UTC instant before 0001-01-01
        assert!(DateTimeOffset::new(0, TimeSpan::from_ticks(TICKS_PER_HOUR)).is_none());
    }

    #[test]
    fn unvalidated_offsets_do_not_overflow() {
        let raw = DateTimeOffset {
            ticks: MAX_TICKS,
            offset: TimeSpan::from_ticks(i64::MIN),
        };
        assert_eq!(raw.utc_ticks(), None);
    }
}
