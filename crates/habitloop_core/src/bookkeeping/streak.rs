//! Current-streak calculation.

use crate::calendar::DayCalendar;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Counts consecutive completed days ending `today`, or ending yesterday
/// when `today` is not (yet) completed.
///
/// Returns `0` when neither today nor yesterday is completed. Gaps before the
/// trailing run do not matter.
pub fn current_streak_for_days(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|day| days.contains(day)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Streak over raw completion timestamps, normalized with `calendar`.
pub fn current_streak(timestamps_ms: &[i64], calendar: &DayCalendar, now_ms: i64) -> u32 {
    current_streak_for_days(
        &calendar.completion_days(timestamps_ms),
        calendar.day_of(now_ms),
    )
}
