//! Calendar-day normalization and time sources.
//!
//! # Responsibility
//! - Map epoch-millisecond timestamps onto calendar days of one fixed
//!   reference timezone.
//! - Provide an injectable clock so day rollover is testable.
//!
//! # Invariants
//! - The reference offset never changes for the lifetime of a `DayCalendar`.
//! - `day_bounds_ms(day)` is half-open: `start <= ts < end` belongs to `day`.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use std::cell::Cell;
use std::collections::BTreeSet;

const MAX_OFFSET_MINUTES: i32 = 23 * 60 + 59;

/// Calendar used to strip time-of-day from timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCalendar {
    offset: FixedOffset,
}

impl DayCalendar {
    /// Creates a calendar for a fixed UTC offset in minutes.
    ///
    /// Out-of-range offsets are clamped to `±23:59`.
    pub fn new(utc_offset_minutes: i32) -> Self {
        let clamped = utc_offset_minutes.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
        let offset = FixedOffset::east_opt(clamped * 60).unwrap_or_else(utc_offset);
        Self { offset }
    }

    /// UTC calendar.
    pub fn utc() -> Self {
        Self::new(0)
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Returns the calendar day containing `epoch_ms`.
    pub fn day_of(&self, epoch_ms: i64) -> NaiveDate {
        let utc = DateTime::<Utc>::from_timestamp_millis(epoch_ms).unwrap_or_default();
        utc.with_timezone(&self.offset).date_naive()
    }

    /// Returns `[start_ms, end_ms)` covering `day` in this calendar.
    pub fn day_bounds_ms(&self, day: NaiveDate) -> (i64, i64) {
        let start = self.start_of_day_ms(day);
        let end = day
            .checked_add_days(Days::new(1))
            .map_or(i64::MAX, |next| self.start_of_day_ms(next));
        (start, end)
    }

    /// Normalizes raw completion timestamps into a set of calendar days.
    pub fn completion_days(&self, timestamps_ms: &[i64]) -> BTreeSet<NaiveDate> {
        timestamps_ms.iter().map(|ts| self.day_of(*ts)).collect()
    }

    fn start_of_day_ms(&self, day: NaiveDate) -> i64 {
        let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map_or(0, |local| local.timestamp_millis())
    }
}

impl Default for DayCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Source of "now" for day-sensitive bookkeeping.
pub trait Clock {
    /// Current time as Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: Cell<i64>,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    /// Clock positioned at `hour:minute` UTC on `day`.
    pub fn at(day: NaiveDate, hour: u32, minute: u32) -> Self {
        let ms = day
            .and_hms_opt(hour, minute, 0)
            .map_or(0, |dt| dt.and_utc().timestamp_millis());
        Self::new(ms)
    }

    pub fn set_ms(&self, now_ms: i64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance_days(&self, days: i64) {
        self.now_ms.set(self.now_ms.get() + days * 86_400_000);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}
