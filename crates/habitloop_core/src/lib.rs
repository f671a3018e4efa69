//! Bookkeeping core for a habit and to-do tracker.
//!
//! Derives streaks from completion history, greets each new calendar day
//! once, and unlocks achievements as thresholds are crossed. UI hosts drive
//! it through [`HabitLoop`] and receive notifications from its [`EventBus`].

pub mod bookkeeping;
pub mod calendar;
pub mod config;
pub mod db;
pub mod events;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;
pub mod session;
pub mod settings;
pub mod statistics;

pub use bookkeeping::achievements::{satisfied_achievements, AchievementTracker};
pub use bookkeeping::daily_reset::{DailyResetCoordinator, ResetOutcome};
pub use bookkeeping::streak::{current_streak, current_streak_for_days};
pub use calendar::{Clock, DayCalendar, FixedClock, SystemClock};
pub use config::{load_config, load_config_or_default, ConfigError, CoreConfig};
pub use events::{CoreEvent, EventBus, EventKind, SubscriptionId};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::achievement::{Achievement, AchievementId, CATALOG};
pub use model::habit::{Habit, HabitColor, HabitIcon, HabitId, ReminderTime};
pub use model::todo::{TodoId, TodoItem, TodoPolicy, TodoTransitionError};
pub use model::ModelValidationError;
pub use reminder::{ReminderPlan, ReminderScheduler};
pub use repo::habit_repo::{HabitRepository, SqliteHabitRepository};
pub use repo::todo_repo::{SqliteTodoRepository, TodoRepository};
pub use repo::{RepoError, RepoResult};
pub use service::habit_service::{HabitDraft, HabitService, ToggleOutcome};
pub use service::todo_service::TodoService;
pub use service::{ServiceError, ServiceResult};
pub use session::{AchievementStatus, ActivationReport, HabitLoop};
pub use settings::{MemorySettingsStore, SettingsStore, SqliteSettingsStore};
pub use statistics::{HabitStatistics, StreakEntry};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
