//! Habit domain model.
//!
//! # Responsibility
//! - Define the habit record and its presentation attributes.
//! - Derive "completed today" and current streak from completion history.
//!
//! # Invariants
//! - `completions` may hold several timestamps for one day; a day counts as
//!   completed when at least one timestamp falls inside it.
//! - The icon variant is decided once, at creation time.

use crate::bookkeeping::streak::current_streak_for_days;
use crate::calendar::DayCalendar;
use crate::model::ModelValidationError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type HabitId = Uuid;

/// Symbol shown when a habit was created without any icon input.
pub const PLACEHOLDER_SYMBOL: &str = "questionmark.circle";

static SYMBOL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(\.[a-z0-9]+)*$").expect("valid symbol regex"));
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9A-Fa-f]{6})$").expect("valid color regex"));
static REMINDER_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid time regex"));

/// Habit icon, classified once from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HabitIcon {
    /// Named symbol from the platform symbol catalog, e.g. `flame.fill`.
    Symbol(String),
    /// Literal text rendered as-is, typically an emoji.
    Glyph(String),
}

impl HabitIcon {
    /// Classifies raw icon input.
    ///
    /// - empty/blank -> placeholder symbol
    /// - dotted lowercase ASCII name -> `Symbol`
    /// - anything else -> `Glyph`
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::placeholder();
        }
        if SYMBOL_NAME_RE.is_match(trimmed) {
            Self::Symbol(trimmed.to_string())
        } else {
            Self::Glyph(trimmed.to_string())
        }
    }

    pub fn placeholder() -> Self {
        Self::Symbol(PLACEHOLDER_SYMBOL.to_string())
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Symbol(value) | Self::Glyph(value) => value,
        }
    }
}

/// Six-digit RGB hex color without leading `#`, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitColor(String);

impl HabitColor {
    /// Color assigned to new habits.
    pub const DEFAULT_HEX: &'static str = "52D7BF";
    /// Color used when a stored value is missing or malformed.
    pub const FALLBACK_HEX: &'static str = "888888";

    pub fn parse(value: &str) -> Result<Self, ModelValidationError> {
        let trimmed = value.trim();
        HEX_COLOR_RE
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|hex| Self(hex.as_str().to_ascii_uppercase()))
            .ok_or_else(|| ModelValidationError::InvalidColor(trimmed.to_string()))
    }

    /// Lenient read used for persisted values.
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|raw| Self::parse(raw).ok())
            .unwrap_or_else(Self::fallback)
    }

    pub fn fallback() -> Self {
        Self(Self::FALLBACK_HEX.to_string())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl Default for HabitColor {
    fn default() -> Self {
        Self(Self::DEFAULT_HEX.to_string())
    }
}

/// Daily reminder time of day in the reference calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderTime {
    pub hour: u8,
    pub minute: u8,
}

impl ReminderTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ModelValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ModelValidationError::InvalidReminderTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Parses `H:MM` / `HH:MM`.
    pub fn parse(value: &str) -> Result<Self, ModelValidationError> {
        let trimmed = value.trim();
        let invalid = || ModelValidationError::InvalidReminderTime(trimmed.to_string());
        let caps = REMINDER_TIME_RE.captures(trimmed).ok_or_else(invalid)?;
        let hour = caps[1].parse::<u8>().map_err(|_| invalid())?;
        let minute = caps[2].parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }

    pub fn minute_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    pub fn from_minute_of_day(value: i64) -> Option<Self> {
        if !(0..24 * 60).contains(&value) {
            return None;
        }
        Self::new((value / 60) as u8, (value % 60) as u8).ok()
    }
}

impl Display for ReminderTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A recurring habit and its completion history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub icon: HabitIcon,
    pub color: HabitColor,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    /// `None` when reminders are off.
    pub reminder: Option<ReminderTime>,
    /// Completion timestamps in epoch milliseconds, oldest first.
    pub completions: Vec<i64>,
}

impl Habit {
    /// Creates a habit with a generated ID and empty history.
    pub fn new(name: impl Into<String>, icon: HabitIcon, created_at_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon,
            color: HabitColor::default(),
            created_at_ms,
            reminder: None,
            completions: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.is_nil() {
            return Err(ModelValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyName);
        }
        Ok(())
    }

    pub fn is_completed_on(&self, calendar: &DayCalendar, day: NaiveDate) -> bool {
        self.completions
            .iter()
            .any(|ts| calendar.day_of(*ts) == day)
    }

    pub fn is_completed_today(&self, calendar: &DayCalendar, now_ms: i64) -> bool {
        self.is_completed_on(calendar, calendar.day_of(now_ms))
    }

    /// Consecutive completed days ending `today` or the day before.
    pub fn current_streak(&self, calendar: &DayCalendar, today: NaiveDate) -> u32 {
        current_streak_for_days(&calendar.completion_days(&self.completions), today)
    }
}
