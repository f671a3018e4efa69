//! To-do item model and completion lifecycle policy.

use crate::model::ModelValidationError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TodoId = Uuid;

/// How a to-do's completed flag may transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPolicy {
    /// `false -> true` only; a completed item stays completed.
    OneWay,
    /// Free toggling in both directions.
    #[default]
    Toggle,
}

/// Rejected completion transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoTransitionError {
    ReopenNotAllowed(TodoId),
}

impl Display for TodoTransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReopenNotAllowed(id) => {
                write!(f, "todo {id} is completed and cannot be reopened")
            }
        }
    }
}

impl Error for TodoTransitionError {}

/// One-off task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub is_completed: bool,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
}

impl TodoItem {
    pub fn new(title: impl Into<String>, created_at_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            is_completed: false,
            created_at_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(ModelValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Applies a completion change under `policy`.
    ///
    /// Returns whether the flag changed. Setting the current value is a no-op.
    pub fn set_completed(
        &mut self,
        completed: bool,
        policy: TodoPolicy,
    ) -> Result<bool, TodoTransitionError> {
        if self.is_completed == completed {
            return Ok(false);
        }
        if !completed && policy == TodoPolicy::OneWay {
            return Err(TodoTransitionError::ReopenNotAllowed(self.id));
        }
        self.is_completed = completed;
        Ok(true)
    }
}
