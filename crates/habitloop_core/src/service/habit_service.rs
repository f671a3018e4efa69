//! Habit use-case service.
//!
//! # Invariants
//! - Toggling today's completion appends one timestamp or removes every
//!   timestamp of today; other days are never touched.
//! - Edits never rewrite completion history.

use crate::calendar::DayCalendar;
use crate::model::habit::{Habit, HabitColor, HabitIcon, HabitId, ReminderTime};
use crate::repo::habit_repo::HabitRepository;
use crate::repo::RepoResult;
use crate::service::{ServiceError, ServiceResult};

/// User input for creating or editing a habit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HabitDraft {
    pub name: String,
    /// Raw icon input; classified once into `HabitIcon`.
    pub icon: String,
    /// Six-digit hex; default color when `None`.
    pub color: Option<String>,
    pub reminder: Option<ReminderTime>,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            ..Self::default()
        }
    }

    fn color(&self) -> ServiceResult<HabitColor> {
        match self.color.as_deref() {
            Some(raw) => Ok(HabitColor::parse(raw)?),
            None => Ok(HabitColor::default()),
        }
    }
}

/// Result of toggling today's completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub habit: Habit,
    /// Completion state for today after the toggle.
    pub completed_today: bool,
}

pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates a habit with empty history.
    pub fn create_habit(&self, draft: &HabitDraft, now_ms: i64) -> ServiceResult<Habit> {
        let mut habit = Habit::new(draft.name.trim(), HabitIcon::from_input(&draft.icon), now_ms);
        habit.color = draft.color()?;
        habit.reminder = draft.reminder;
        self.repo.create_habit(&habit)?;
        Ok(habit)
    }

    /// Replaces name, icon, color and reminder of an existing habit.
    pub fn edit_habit(&self, id: HabitId, draft: &HabitDraft) -> ServiceResult<Habit> {
        let mut habit = self.require(id)?;
        habit.name = draft.name.trim().to_string();
        habit.icon = HabitIcon::from_input(&draft.icon);
        habit.color = draft.color()?;
        habit.reminder = draft.reminder;
        self.repo.update_habit(&habit)?;
        Ok(habit)
    }

    pub fn delete_habit(&self, id: HabitId) -> ServiceResult<()> {
        self.repo.delete_habit(id)?;
        Ok(())
    }

    pub fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        self.repo.get_habit(id)
    }

    pub fn list_habits(&self) -> RepoResult<Vec<Habit>> {
        self.repo.list_habits()
    }

    /// Marks today complete, or un-marks it when already complete.
    pub fn toggle_today(
        &self,
        id: HabitId,
        calendar: &DayCalendar,
        now_ms: i64,
    ) -> ServiceResult<ToggleOutcome> {
        let habit = self.require(id)?;
        let today = calendar.day_of(now_ms);

        let completed_today = if habit.is_completed_on(calendar, today) {
            let (start_ms, end_ms) = calendar.day_bounds_ms(today);
            self.repo.remove_completions_between(id, start_ms, end_ms)?;
            false
        } else {
            self.repo.record_completion(id, now_ms)?;
            true
        };

        Ok(ToggleOutcome {
            habit: self.require(id)?,
            completed_today,
        })
    }

    fn require(&self, id: HabitId) -> ServiceResult<Habit> {
        self.repo.get_habit(id)?.ok_or(ServiceError::NotFound(id))
    }
}
