//! Domain model for habits, to-do items and achievements.
//!
//! # Responsibility
//! - Define canonical data structures used by bookkeeping and services.
//! - Keep derived status (completed today, current streak) computed on read.
//!
//! # Invariants
//! - Every persisted entity is identified by a stable, non-nil UUID.
//! - Habit completion history is the only source of completion state.

pub mod achievement;
pub mod habit;
pub mod todo;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures shared by habit and to-do models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    NilId,
    EmptyName,
    EmptyTitle,
    InvalidColor(String),
    InvalidReminderTime(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "id must not be nil"),
            Self::EmptyName => write!(f, "habit name must not be empty"),
            Self::EmptyTitle => write!(f, "todo title must not be empty"),
            Self::InvalidColor(value) => {
                write!(f, "invalid color `{value}`; expected six hex digits")
            }
            Self::InvalidReminderTime(value) => {
                write!(f, "invalid reminder time `{value}`; expected HH:MM")
            }
        }
    }
}

impl Error for ModelValidationError {}
