//! Daily habit reminder planning.
//!
//! Delivery belongs to the platform; the core only decides what should be
//! scheduled and when it should be withdrawn.

use crate::model::habit::{Habit, HabitId, ReminderTime};
use log::info;

const REMINDER_TITLE: &str = "Habit reminder";

/// A repeating daily reminder for one habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlan {
    /// Doubles as the platform request identifier.
    pub habit_id: HabitId,
    pub time: ReminderTime,
    pub title: String,
    pub body: String,
}

impl ReminderPlan {
    /// Plan for `habit`, or `None` when its reminder is off.
    pub fn for_habit(habit: &Habit) -> Option<Self> {
        let time = habit.reminder?;
        Some(Self {
            habit_id: habit.id,
            time,
            title: REMINDER_TITLE.to_string(),
            body: format!("Time to complete your habit: {}", habit.name.trim()),
        })
    }
}

/// Platform notification scheduler.
pub trait ReminderScheduler {
    /// Schedules or replaces the reminder for `plan.habit_id`.
    fn schedule(&mut self, plan: &ReminderPlan);
    /// Withdraws any pending reminder for `habit_id`.
    fn cancel(&mut self, habit_id: HabitId);
}

/// Scheduler that only records intent in the log.
#[derive(Debug, Default)]
pub struct LogReminderScheduler;

impl ReminderScheduler for LogReminderScheduler {
    fn schedule(&mut self, plan: &ReminderPlan) {
        info!(
            "event=reminder_schedule module=reminder status=ok habit_id={} at={}",
            plan.habit_id, plan.time
        );
    }

    fn cancel(&mut self, habit_id: HabitId) {
        info!(
            "event=reminder_cancel module=reminder status=ok habit_id={}",
            habit_id
        );
    }
}

/// Brings the scheduler in line with `habit`: schedule when enabled,
/// cancel otherwise.
pub fn sync_reminder(scheduler: &mut dyn ReminderScheduler, habit: &Habit) {
    match ReminderPlan::for_habit(habit) {
        Some(plan) => scheduler.schedule(&plan),
        None => scheduler.cancel(habit.id),
    }
}
