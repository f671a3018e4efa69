//! Application-lifetime session over one database connection.
//!
//! # Responsibility
//! - Wire services, bookkeeping, reminders and the event bus together.
//! - Run the activation pass: first-run seeding, new-day check, achievement
//!   evaluation.
//! - Re-evaluate achievements after every mutation that can cross a
//!   threshold.
//!
//! # Invariants
//! - All calls happen on the host's UI thread; nothing here is `Send`.
//! - Unlock events are queued, never delivered inline; the host pumps them
//!   with `dispatch_events()` on its next loop cycle.

use crate::bookkeeping::achievements::AchievementTracker;
use crate::bookkeeping::daily_reset::{DailyResetCoordinator, ResetOutcome};
use crate::calendar::{Clock, DayCalendar, SystemClock};
use crate::config::CoreConfig;
use crate::events::EventBus;
use crate::model::achievement::{Achievement, AchievementId, CATALOG};
use crate::model::habit::{Habit, HabitId, ReminderTime};
use crate::model::todo::{TodoId, TodoItem};
use crate::reminder::{sync_reminder, LogReminderScheduler, ReminderScheduler};
use crate::repo::habit_repo::SqliteHabitRepository;
use crate::repo::todo_repo::SqliteTodoRepository;
use crate::repo::RepoResult;
use crate::service::habit_service::{HabitDraft, HabitService, ToggleOutcome};
use crate::service::todo_service::TodoService;
use crate::service::ServiceResult;
use crate::settings::{read_flag, write_flag, SqliteSettingsStore, SAMPLE_DATA_SEEDED_KEY};
use crate::statistics::HabitStatistics;
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;
use std::collections::BTreeSet;

const SAMPLE_HABIT_NAME: &str = "Exercise for 30 minutes";
const SAMPLE_HABIT_ICON: &str = "flame.fill";
const SAMPLE_TODO_TITLE: &str = "Finish the project report";

/// What one activation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub seeded_sample_data: bool,
    pub reset: ResetOutcome,
    pub unlocked: Vec<AchievementId>,
}

/// Catalog entry paired with its unlock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementStatus {
    pub achievement: Achievement,
    pub unlocked: bool,
}

pub struct HabitLoop<'conn, C: Clock = SystemClock> {
    settings: SqliteSettingsStore<'conn>,
    habits: HabitService<SqliteHabitRepository<'conn>>,
    todos: TodoService<SqliteTodoRepository<'conn>>,
    calendar: DayCalendar,
    clock: C,
    daily_reset: DailyResetCoordinator,
    achievements: AchievementTracker,
    reminders: Box<dyn ReminderScheduler>,
    bus: EventBus,
    seed_sample_data: bool,
}

impl<'conn, C: Clock> HabitLoop<'conn, C> {
    /// Builds a session; loads the persisted unlocked-achievement set.
    pub fn new(conn: &'conn Connection, config: &CoreConfig, clock: C) -> Self {
        let calendar = DayCalendar::new(config.calendar.utc_offset_minutes);
        let settings = SqliteSettingsStore::new(conn);
        let achievements = AchievementTracker::load(&settings);

        Self {
            settings,
            habits: HabitService::new(SqliteHabitRepository::new(conn)),
            todos: TodoService::new(SqliteTodoRepository::new(conn), config.todos.policy),
            calendar,
            clock,
            daily_reset: DailyResetCoordinator::new(calendar),
            achievements,
            reminders: Box::new(LogReminderScheduler),
            bus: EventBus::new(),
            seed_sample_data: config.seed.sample_data,
        }
    }

    /// Replaces the platform reminder scheduler.
    pub fn with_reminder_scheduler(mut self, scheduler: impl ReminderScheduler + 'static) -> Self {
        self.reminders = Box::new(scheduler);
        self
    }

    pub fn calendar(&self) -> DayCalendar {
        self.calendar
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.day_of(self.clock.now_ms())
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Delivers queued events to subscribers. Call once per host loop cycle.
    pub fn dispatch_events(&mut self) -> usize {
        self.bus.dispatch_pending()
    }

    /// Foreground/activation entry point.
    pub fn activate(&mut self) -> ActivationReport {
        let seeded_sample_data = self.seed_if_needed();

        let now_ms = self.clock.now_ms();
        let reset = self.daily_reset.run(
            now_ms,
            &self.settings,
            self.habits.repo(),
            &mut self.bus,
        );
        if let ResetOutcome::NewDay { habits, .. } = &reset {
            for habit in habits {
                sync_reminder(self.reminders.as_mut(), habit);
            }
        }

        let unlocked = self.evaluate_achievements();
        ActivationReport {
            seeded_sample_data,
            reset,
            unlocked,
        }
    }

    /// Re-scans habits and unlocks newly satisfied achievements.
    ///
    /// An unreadable habit collection skips the scan.
    pub fn evaluate_achievements(&mut self) -> Vec<AchievementId> {
        let habits = match self.habits.list_habits() {
            Ok(habits) => habits,
            Err(err) => {
                warn!(
                    "event=achievement_scan module=session status=skipped error={}",
                    err
                );
                return Vec::new();
            }
        };
        let today = self.today();
        self.achievements
            .evaluate(&habits, &self.calendar, today, &self.settings, &mut self.bus)
    }

    pub fn unlocked_achievements(&self) -> &BTreeSet<AchievementId> {
        self.achievements.unlocked()
    }

    /// Full catalog in display order with unlock state.
    pub fn achievement_overview(&self) -> Vec<AchievementStatus> {
        CATALOG
            .iter()
            .map(|achievement| AchievementStatus {
                achievement: *achievement,
                unlocked: self.achievements.is_unlocked(achievement.id),
            })
            .collect()
    }

    pub fn create_habit(&mut self, draft: &HabitDraft) -> ServiceResult<Habit> {
        let habit = self.habits.create_habit(draft, self.clock.now_ms())?;
        info!(
            "event=habit_create module=session status=ok habit_id={} reminder={}",
            habit.id,
            habit.reminder.is_some()
        );
        sync_reminder(self.reminders.as_mut(), &habit);
        self.evaluate_achievements();
        Ok(habit)
    }

    pub fn edit_habit(&mut self, id: HabitId, draft: &HabitDraft) -> ServiceResult<Habit> {
        let habit = self.habits.edit_habit(id, draft)?;
        sync_reminder(self.reminders.as_mut(), &habit);
        Ok(habit)
    }

    pub fn delete_habit(&mut self, id: HabitId) -> ServiceResult<()> {
        self.habits.delete_habit(id)?;
        self.reminders.cancel(id);
        info!("event=habit_delete module=session status=ok habit_id={}", id);
        Ok(())
    }

    pub fn toggle_habit_today(&mut self, id: HabitId) -> ServiceResult<ToggleOutcome> {
        let outcome = self
            .habits
            .toggle_today(id, &self.calendar, self.clock.now_ms())?;
        self.evaluate_achievements();
        Ok(outcome)
    }

    pub fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        self.habits.get_habit(id)
    }

    pub fn list_habits(&self) -> RepoResult<Vec<Habit>> {
        self.habits.list_habits()
    }

    pub fn statistics(&self) -> RepoResult<HabitStatistics> {
        let habits = self.habits.list_habits()?;
        Ok(HabitStatistics::compute(&habits, &self.calendar, self.today()))
    }

    pub fn create_todo(&mut self, title: &str) -> ServiceResult<TodoItem> {
        self.todos.create_todo(title, self.clock.now_ms())
    }

    pub fn rename_todo(&mut self, id: TodoId, title: &str) -> ServiceResult<TodoItem> {
        self.todos.rename_todo(id, title)
    }

    pub fn set_todo_completed(&mut self, id: TodoId, completed: bool) -> ServiceResult<TodoItem> {
        self.todos.set_completed(id, completed)
    }

    pub fn toggle_todo(&mut self, id: TodoId) -> ServiceResult<TodoItem> {
        self.todos.toggle_todo(id)
    }

    pub fn delete_todo(&mut self, id: TodoId) -> ServiceResult<()> {
        self.todos.delete_todo(id)
    }

    pub fn list_todos(&self) -> RepoResult<Vec<TodoItem>> {
        self.todos.list_todos()
    }

    fn seed_if_needed(&mut self) -> bool {
        if !self.seed_sample_data || read_flag(&self.settings, SAMPLE_DATA_SEEDED_KEY) {
            return false;
        }

        let now_ms = self.clock.now_ms();
        let draft = HabitDraft {
            reminder: ReminderTime::new(8, 0).ok(),
            ..HabitDraft::new(SAMPLE_HABIT_NAME, SAMPLE_HABIT_ICON)
        };
        let habit = match self.habits.create_habit(&draft, now_ms) {
            Ok(habit) => habit,
            Err(err) => {
                warn!("event=sample_seed module=session status=error phase=habit error={}", err);
                return false;
            }
        };
        // Seeding counts as done once the sample habit exists.
        if let Err(err) = write_flag(&self.settings, SAMPLE_DATA_SEEDED_KEY, true) {
            warn!("event=sample_seed module=session status=error phase=flag error={}", err);
        }
        sync_reminder(self.reminders.as_mut(), &habit);

        if let Err(err) = self.todos.create_todo(SAMPLE_TODO_TITLE, now_ms) {
            warn!("event=sample_seed module=session status=error phase=todo error={}", err);
        }
        info!("event=sample_seed module=session status=ok");
        true
    }
}
