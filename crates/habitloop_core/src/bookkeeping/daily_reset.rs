//! Once-per-day activation bookkeeping.
//!
//! Completion state is derived from history, so a new day needs no data
//! mutation. The coordinator only records "last visit" and hands a habit
//! snapshot to once-per-day side effects (reminder rescheduling).

use crate::calendar::DayCalendar;
use crate::events::{CoreEvent, EventBus};
use crate::model::habit::Habit;
use crate::repo::habit_repo::HabitRepository;
use crate::settings::{read_last_visit_day, write_last_visit_day, SettingsStore};
use chrono::NaiveDate;
use log::{info, warn};

/// Result of one activation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// No last-visit value existed; today was recorded.
    FirstRun { day: NaiveDate },
    /// Already greeted today.
    SameDay { day: NaiveDate },
    /// A new day was greeted.
    NewDay {
        day: NaiveDate,
        previous: NaiveDate,
        habits: Vec<Habit>,
    },
    /// New day detected but bookkeeping could not complete; retried on the
    /// next activation.
    Deferred { day: NaiveDate },
}

impl ResetOutcome {
    /// Whether the new-day pass ran and was committed.
    pub fn performed(&self) -> bool {
        matches!(self, Self::NewDay { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DailyResetCoordinator {
    calendar: DayCalendar,
}

impl DailyResetCoordinator {
    pub fn new(calendar: DayCalendar) -> Self {
        Self { calendar }
    }

    /// Runs the new-day check and reports whether a new day was greeted.
    pub fn reset_if_new_day(
        &self,
        now_ms: i64,
        settings: &dyn SettingsStore,
        habits: &dyn HabitRepository,
        bus: &mut EventBus,
    ) -> bool {
        self.run(now_ms, settings, habits, bus).performed()
    }

    /// Runs the new-day check.
    ///
    /// Any stored day other than today counts as a new day, including a
    /// stored day in the future after a clock change.
    pub fn run(
        &self,
        now_ms: i64,
        settings: &dyn SettingsStore,
        habits: &dyn HabitRepository,
        bus: &mut EventBus,
    ) -> ResetOutcome {
        let today = self.calendar.day_of(now_ms);

        let Some(previous) = read_last_visit_day(settings) else {
            if let Err(err) = write_last_visit_day(settings, today) {
                warn!(
                    "event=daily_reset module=bookkeeping status=error phase=first_run error={}",
                    err
                );
            }
            info!("event=daily_reset module=bookkeeping status=ok phase=first_run");
            return ResetOutcome::FirstRun { day: today };
        };

        if previous == today {
            return ResetOutcome::SameDay { day: today };
        }

        let snapshot = match habits.list_habits() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    "event=daily_reset module=bookkeeping status=deferred phase=fetch error={}",
                    err
                );
                return ResetOutcome::Deferred { day: today };
            }
        };

        if let Err(err) = write_last_visit_day(settings, today) {
            warn!(
                "event=daily_reset module=bookkeeping status=deferred phase=persist error={}",
                err
            );
            return ResetOutcome::Deferred { day: today };
        }

        info!(
            "event=daily_reset module=bookkeeping status=ok phase=new_day habits={} gap_days={}",
            snapshot.len(),
            (today - previous).num_days()
        );
        bus.publish(CoreEvent::DayStarted {
            day: today,
            previous: Some(previous),
        });

        ResetOutcome::NewDay {
            day: today,
            previous,
            habits: snapshot,
        }
    }
}
