//! Habit repository contract and SQLite implementation.
//!
//! # Invariants
//! - Completion history is append-only per timestamp row; removal is by
//!   time range so a whole day can be un-completed at once.
//! - Lists are ordered by creation time, then id.

use crate::model::habit::{Habit, HabitColor, HabitIcon, HabitId, ReminderTime};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const HABIT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    icon_kind,
    icon_value,
    color_hex,
    created_at,
    reminder_minute
FROM habits";

/// Data-access interface for habits and their completion history.
pub trait HabitRepository {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    /// Replaces name, icon, color and reminder. History is untouched.
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    fn list_habits(&self) -> RepoResult<Vec<Habit>>;
    fn delete_habit(&self, id: HabitId) -> RepoResult<()>;
    fn record_completion(&self, id: HabitId, at_ms: i64) -> RepoResult<()>;
    /// Removes completions with `start_ms <= completed_at < end_ms`.
    fn remove_completions_between(
        &self,
        id: HabitId,
        start_ms: i64,
        end_ms: i64,
    ) -> RepoResult<usize>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn habit_exists(&self, id: HabitId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM habits WHERE uuid = ?1;",
                [id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn load_completions(&self, id: HabitId) -> RepoResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT completed_at FROM habit_completions
             WHERE habit_uuid = ?1
             ORDER BY completed_at ASC, id ASC;",
        )?;
        let rows = stmt.query_map([id.to_string()], |row| row.get::<_, i64>(0))?;
        let mut completions = Vec::new();
        for row in rows {
            completions.push(row?);
        }
        Ok(completions)
    }

    fn load_all_completions(&self) -> RepoResult<HashMap<String, Vec<i64>>> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_uuid, completed_at FROM habit_completions
             ORDER BY completed_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut by_habit: HashMap<String, Vec<i64>> = HashMap::new();
        while let Some(row) = rows.next()? {
            let habit_uuid: String = row.get(0)?;
            by_habit.entry(habit_uuid).or_default().push(row.get(1)?);
        }
        Ok(by_habit)
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;
        let (icon_kind, icon_value) = icon_to_db(&habit.icon);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habits (
                uuid,
                name,
                icon_kind,
                icon_value,
                color_hex,
                created_at,
                reminder_minute
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                habit.id.to_string(),
                habit.name.trim(),
                icon_kind,
                icon_value,
                habit.color.as_hex(),
                habit.created_at_ms,
                habit.reminder.map(|time| i64::from(time.minute_of_day())),
            ],
        )?;
        for at_ms in &habit.completions {
            tx.execute(
                "INSERT INTO habit_completions (habit_uuid, completed_at) VALUES (?1, ?2);",
                params![habit.id.to_string(), at_ms],
            )?;
        }
        tx.commit()?;

        Ok(habit.id)
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;
        let (icon_kind, icon_value) = icon_to_db(&habit.icon);

        let changed = self.conn.execute(
            "UPDATE habits
             SET
                name = ?1,
                icon_kind = ?2,
                icon_value = ?3,
                color_hex = ?4,
                reminder_minute = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                habit.name.trim(),
                icon_kind,
                icon_value,
                habit.color.as_hex(),
                habit.reminder.map(|time| i64::from(time.minute_of_day())),
                habit.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(habit.id));
        }
        Ok(())
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut habit = parse_habit_row(row)?;
        habit.completions = self.load_completions(habit.id)?;
        Ok(Some(habit))
    }

    fn list_habits(&self) -> RepoResult<Vec<Habit>> {
        let mut completions = self.load_all_completions()?;
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut habits = Vec::new();

        while let Some(row) = rows.next()? {
            let mut habit = parse_habit_row(row)?;
            habit.completions = completions
                .remove(&habit.id.to_string())
                .unwrap_or_default();
            habits.push(habit);
        }
        Ok(habits)
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn record_completion(&self, id: HabitId, at_ms: i64) -> RepoResult<()> {
        if !self.habit_exists(id)? {
            return Err(RepoError::NotFound(id));
        }
        self.conn.execute(
            "INSERT INTO habit_completions (habit_uuid, completed_at) VALUES (?1, ?2);",
            params![id.to_string(), at_ms],
        )?;
        Ok(())
    }

    fn remove_completions_between(
        &self,
        id: HabitId,
        start_ms: i64,
        end_ms: i64,
    ) -> RepoResult<usize> {
        if !self.habit_exists(id)? {
            return Err(RepoError::NotFound(id));
        }
        let removed = self.conn.execute(
            "DELETE FROM habit_completions
             WHERE habit_uuid = ?1
               AND completed_at >= ?2
               AND completed_at < ?3;",
            params![id.to_string(), start_ms, end_ms],
        )?;
        Ok(removed)
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "habits.uuid")?;

    let icon_kind: String = row.get("icon_kind")?;
    let icon_value: String = row.get("icon_value")?;
    let icon = parse_icon(&icon_kind, icon_value)?;

    let reminder = match row.get::<_, Option<i64>>("reminder_minute")? {
        Some(value) => Some(ReminderTime::from_minute_of_day(value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid reminder minute `{value}` in habits.reminder_minute"
            ))
        })?),
        None => None,
    };

    let color_hex: Option<String> = row.get("color_hex")?;
    let habit = Habit {
        id,
        name: row.get("name")?,
        icon,
        color: HabitColor::from_stored(color_hex.as_deref()),
        created_at_ms: row.get("created_at")?,
        reminder,
        completions: Vec::new(),
    };
    habit.validate()?;
    Ok(habit)
}

fn icon_to_db(icon: &HabitIcon) -> (&'static str, &str) {
    match icon {
        HabitIcon::Symbol(value) => ("symbol", value.as_str()),
        HabitIcon::Glyph(value) => ("glyph", value.as_str()),
    }
}

fn parse_icon(kind: &str, value: String) -> RepoResult<HabitIcon> {
    match kind {
        "symbol" => Ok(HabitIcon::Symbol(value)),
        "glyph" => Ok(HabitIcon::Glyph(value)),
        other => Err(RepoError::InvalidData(format!(
            "invalid icon kind `{other}` in habits.icon_kind"
        ))),
    }
}
