//! Derived habit statistics for the overview screen.

use crate::calendar::DayCalendar;
use crate::model::habit::{Habit, HabitId};
use chrono::NaiveDate;
use serde::Serialize;

/// Number of entries on the streak leaderboard.
pub const LEADERBOARD_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakEntry {
    pub habit_id: HabitId,
    pub name: String,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStatistics {
    pub day: NaiveDate,
    pub total_habits: usize,
    pub completed_today: usize,
    /// `completed_today / total_habits` in `[0, 1]`; `0` with no habits.
    pub completion_rate: f64,
    /// Every habit in input order.
    pub streaks: Vec<StreakEntry>,
    /// Longest streaks first; ties keep input order.
    pub leaderboard: Vec<StreakEntry>,
}

impl HabitStatistics {
    pub fn compute(habits: &[Habit], calendar: &DayCalendar, today: NaiveDate) -> Self {
        let completed_today = habits
            .iter()
            .filter(|habit| habit.is_completed_on(calendar, today))
            .count();
        let completion_rate = if habits.is_empty() {
            0.0
        } else {
            (completed_today as f64 / habits.len() as f64).min(1.0)
        };

        let streaks: Vec<StreakEntry> = habits
            .iter()
            .map(|habit| StreakEntry {
                habit_id: habit.id,
                name: habit.name.clone(),
                streak: habit.current_streak(calendar, today),
            })
            .collect();

        let mut leaderboard = streaks.clone();
        leaderboard.sort_by(|a, b| b.streak.cmp(&a.streak));
        leaderboard.truncate(LEADERBOARD_SIZE);

        Self {
            day: today,
            total_habits: habits.len(),
            completed_today,
            completion_rate,
            streaks,
            leaderboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HabitStatistics;
    use crate::calendar::DayCalendar;
    use crate::model::habit::{Habit, HabitIcon};
    use chrono::NaiveDate;

    fn habit_with_days(name: &str, calendar: &DayCalendar, days: &[NaiveDate]) -> Habit {
        let mut habit = Habit::new(name, HabitIcon::placeholder(), 0);
        habit.completions = days
            .iter()
            .map(|day| calendar.day_bounds_ms(*day).0 + 3_600_000)
            .collect();
        habit
    }

    #[test]
    fn empty_collection_has_zero_rate() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let stats = HabitStatistics::compute(&[], &DayCalendar::utc(), today);
        assert_eq!(stats.total_habits, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert!(stats.leaderboard.is_empty());
    }

    #[test]
    fn leaderboard_is_sorted_and_capped() {
        let calendar = DayCalendar::utc();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let d = |back: u64| today.checked_sub_days(chrono::Days::new(back)).unwrap();

        let habits = vec![
            habit_with_days("a", &calendar, &[d(0)]),
            habit_with_days("b", &calendar, &[d(0), d(1), d(2)]),
            habit_with_days("c", &calendar, &[]),
            habit_with_days("d", &calendar, &[d(1), d(2)]),
        ];
        let stats = HabitStatistics::compute(&habits, &calendar, today);

        assert_eq!(stats.completed_today, 2);
        assert_eq!(stats.completion_rate, 0.5);
        let names: Vec<&str> = stats.leaderboard.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "a"]);
        assert_eq!(stats.streaks.len(), 4);
    }
}
