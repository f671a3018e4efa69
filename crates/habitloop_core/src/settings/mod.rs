//! Key-value settings store and typed bookkeeping keys.
//!
//! # Responsibility
//! - Abstract the small persistent key-value store used by bookkeeping.
//! - Decode typed values leniently: malformed values read as absent.
//!
//! # Invariants
//! - `set` returns only after the value is durable in the backing store.
//! - Typed readers never fail; corrupt data falls back to defaults.

use crate::db::DbError;
use crate::model::achievement::AchievementId;
use chrono::NaiveDate;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Calendar day of the most recent activation, `YYYY-MM-DD`.
pub const LAST_VISIT_DAY_KEY: &str = "last_visit_day";
/// JSON array of unlocked achievement ids.
pub const UNLOCKED_ACHIEVEMENTS_KEY: &str = "unlocked_achievements";
/// Present once first-run sample data was inserted.
pub const SAMPLE_DATA_SEEDED_KEY: &str = "sample_data_seeded";

const DAY_FORMAT: &str = "%Y-%m-%d";

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug)]
pub enum SettingsError {
    Db(DbError),
    Encode(String),
    Unavailable(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(message) => write!(f, "failed to encode setting: {message}"),
            Self::Unavailable(message) => write!(f, "settings store unavailable: {message}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for SettingsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Minimal persistent key-value store.
pub trait SettingsStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> SettingsResult<()>;
}

/// SQLite-backed settings table.
pub struct SqliteSettingsStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsStore for SqliteSettingsStore<'_> {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> SettingsResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SettingsResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads the last visit day; missing, unreadable or malformed values are `None`.
pub fn read_last_visit_day(store: &dyn SettingsStore) -> Option<NaiveDate> {
    let raw = read_lenient(store, LAST_VISIT_DAY_KEY)?;
    match NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT) {
        Ok(day) => Some(day),
        Err(_) => {
            warn!(
                "event=settings_read module=settings status=malformed key={}",
                LAST_VISIT_DAY_KEY
            );
            None
        }
    }
}

pub fn write_last_visit_day(store: &dyn SettingsStore, day: NaiveDate) -> SettingsResult<()> {
    store.set(LAST_VISIT_DAY_KEY, &day.format(DAY_FORMAT).to_string())
}

/// Reads the unlocked achievement set.
///
/// A malformed list reads as empty; unknown ids inside a valid list are
/// skipped.
pub fn read_unlocked_achievements(store: &dyn SettingsStore) -> BTreeSet<AchievementId> {
    let Some(raw) = read_lenient(store, UNLOCKED_ACHIEVEMENTS_KEY) else {
        return BTreeSet::new();
    };
    let ids = match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => ids,
        Err(_) => {
            warn!(
                "event=settings_read module=settings status=malformed key={}",
                UNLOCKED_ACHIEVEMENTS_KEY
            );
            return BTreeSet::new();
        }
    };
    ids.iter()
        .filter_map(|id| id.parse::<AchievementId>().ok())
        .collect()
}

pub fn write_unlocked_achievements(
    store: &dyn SettingsStore,
    unlocked: &BTreeSet<AchievementId>,
) -> SettingsResult<()> {
    let ids: Vec<&str> = unlocked.iter().map(|id| id.as_str()).collect();
    let encoded =
        serde_json::to_string(&ids).map_err(|err| SettingsError::Encode(err.to_string()))?;
    store.set(UNLOCKED_ACHIEVEMENTS_KEY, &encoded)
}

pub fn read_flag(store: &dyn SettingsStore, key: &str) -> bool {
    read_lenient(store, key).is_some_and(|value| value.trim() == "true")
}

pub fn write_flag(store: &dyn SettingsStore, key: &str, value: bool) -> SettingsResult<()> {
    store.set(key, if value { "true" } else { "false" })
}

fn read_lenient(store: &dyn SettingsStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=settings_read module=settings status=error key={} error={}",
                key, err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        read_last_visit_day, read_unlocked_achievements, write_last_visit_day,
        write_unlocked_achievements, MemorySettingsStore, SettingsStore, LAST_VISIT_DAY_KEY,
        UNLOCKED_ACHIEVEMENTS_KEY,
    };
    use crate::model::achievement::AchievementId;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    #[test]
    fn last_visit_day_roundtrips_and_malformed_reads_absent() {
        let store = MemorySettingsStore::new();
        assert_eq!(read_last_visit_day(&store), None);

        let day = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        write_last_visit_day(&store, day).unwrap();
        assert_eq!(read_last_visit_day(&store), Some(day));

        store.set(LAST_VISIT_DAY_KEY, "yesterday-ish").unwrap();
        assert_eq!(read_last_visit_day(&store), None);
    }

    #[test]
    fn unlocked_set_skips_unknown_ids_and_tolerates_garbage() {
        let store = MemorySettingsStore::new();
        store
            .set(UNLOCKED_ACHIEVEMENTS_KEY, r#"["streak_7","legacy_badge"]"#)
            .unwrap();
        assert_eq!(
            read_unlocked_achievements(&store),
            BTreeSet::from([AchievementId::Streak7])
        );

        store.set(UNLOCKED_ACHIEVEMENTS_KEY, "{not json").unwrap();
        assert!(read_unlocked_achievements(&store).is_empty());

        let unlocked = BTreeSet::from([AchievementId::FirstHabit, AchievementId::Streak30]);
        write_unlocked_achievements(&store, &unlocked).unwrap();
        assert_eq!(read_unlocked_achievements(&store), unlocked);
    }
}
