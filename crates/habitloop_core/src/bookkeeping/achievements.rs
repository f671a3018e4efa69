//! Achievement unlock evaluation.
//!
//! # Invariants
//! - Unlocks are monotonic: an unlocked id is never re-locked or re-announced.
//! - An unlock is persisted before its event is queued; a failed persist
//!   leaves the id locked so the next evaluation retries it.
//! - Rules are checked in catalog order, so events queue in that order.

use crate::calendar::DayCalendar;
use crate::events::{CoreEvent, EventBus};
use crate::model::achievement::{AchievementId, CATALOG};
use crate::model::habit::Habit;
use crate::settings::{read_unlocked_achievements, write_unlocked_achievements, SettingsStore};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeSet;

/// More than this many habits unlocks `habit_master`.
pub const HABIT_MASTER_THRESHOLD: usize = 5;
pub const STREAK_7_THRESHOLD: u32 = 7;
pub const STREAK_30_THRESHOLD: u32 = 30;

/// Facts the unlock rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RuleInputs {
    habit_count: usize,
    best_streak: u32,
}

impl RuleInputs {
    fn collect(habits: &[Habit], calendar: &DayCalendar, today: NaiveDate) -> Self {
        Self {
            habit_count: habits.len(),
            best_streak: habits
                .iter()
                .map(|habit| habit.current_streak(calendar, today))
                .max()
                .unwrap_or(0),
        }
    }

    fn satisfies(&self, id: AchievementId) -> bool {
        match id {
            AchievementId::FirstHabit => self.habit_count > 0,
            AchievementId::HabitMaster => self.habit_count > HABIT_MASTER_THRESHOLD,
            AchievementId::Streak7 => self.best_streak >= STREAK_7_THRESHOLD,
            AchievementId::Streak30 => self.best_streak >= STREAK_30_THRESHOLD,
            // Reserved; no unlock criterion yet.
            AchievementId::PerfectWeek => false,
        }
    }
}

/// Ids whose rule currently holds, in catalog order.
pub fn satisfied_achievements(
    habits: &[Habit],
    calendar: &DayCalendar,
    today: NaiveDate,
) -> Vec<AchievementId> {
    let inputs = RuleInputs::collect(habits, calendar, today);
    CATALOG
        .iter()
        .map(|entry| entry.id)
        .filter(|id| inputs.satisfies(*id))
        .collect()
}

/// Holds the unlocked set for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementTracker {
    unlocked: BTreeSet<AchievementId>,
}

impl AchievementTracker {
    /// Loads the persisted unlocked set; malformed data loads as empty.
    pub fn load(store: &dyn SettingsStore) -> Self {
        Self {
            unlocked: read_unlocked_achievements(store),
        }
    }

    pub fn unlocked(&self) -> &BTreeSet<AchievementId> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }

    /// Unlocks every achievement whose rule newly holds.
    ///
    /// Returns the newly unlocked ids in catalog order. Each one is persisted
    /// and then queued on `bus` as `CoreEvent::AchievementUnlocked`.
    pub fn evaluate(
        &mut self,
        habits: &[Habit],
        calendar: &DayCalendar,
        today: NaiveDate,
        store: &dyn SettingsStore,
        bus: &mut EventBus,
    ) -> Vec<AchievementId> {
        let mut delta = Vec::new();

        for id in satisfied_achievements(habits, calendar, today) {
            if !self.unlocked.insert(id) {
                continue;
            }

            if let Err(err) = write_unlocked_achievements(store, &self.unlocked) {
                self.unlocked.remove(&id);
                warn!(
                    "event=achievement_unlock module=bookkeeping status=deferred id={} error={}",
                    id, err
                );
                continue;
            }

            info!(
                "event=achievement_unlock module=bookkeeping status=ok id={}",
                id
            );
            bus.publish(CoreEvent::AchievementUnlocked(*id.definition()));
            delta.push(id);
        }

        delta
    }
}
