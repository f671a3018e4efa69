use habitloop_core::db::open_db_in_memory;
use habitloop_core::{
    DayCalendar, Habit, HabitColor, HabitDraft, HabitIcon, HabitRepository, HabitService,
    ModelValidationError, ReminderTime, RepoError, ServiceError, SqliteHabitRepository,
};
use chrono::NaiveDate;
use uuid::Uuid;

const DAY_MS: i64 = 86_400_000;

fn noon(calendar: &DayCalendar, day: NaiveDate) -> i64 {
    calendar.day_bounds_ms(day).0 + DAY_MS / 2
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn create_and_get_roundtrip_preserves_history_and_reminder() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::new(&conn);

    let mut habit = Habit::new("Read", HabitIcon::from_input("book.fill"), 1_000);
    habit.reminder = Some(ReminderTime::new(21, 15).unwrap());
    habit.completions = vec![5_000, 2_000];
    repo.create_habit(&habit).unwrap();

    let loaded = repo.get_habit(habit.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Read");
    assert_eq!(loaded.icon, HabitIcon::Symbol("book.fill".to_string()));
    assert_eq!(loaded.color, HabitColor::default());
    assert_eq!(loaded.reminder, Some(ReminderTime::new(21, 15).unwrap()));
    assert_eq!(loaded.completions, vec![2_000, 5_000]);
}

#[test]
fn list_is_ordered_by_creation_time() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::new(&conn);

    let later = Habit::new("later", HabitIcon::from_input("🧘"), 20);
    let earlier = Habit::new("earlier", HabitIcon::from_input("🏃"), 10);
    repo.create_habit(&later).unwrap();
    repo.create_habit(&earlier).unwrap();
    repo.record_completion(later.id, 99).unwrap();

    let names: Vec<String> = repo
        .list_habits()
        .unwrap()
        .into_iter()
        .map(|habit| habit.name)
        .collect();
    assert_eq!(names, vec!["earlier", "later"]);
    assert_eq!(repo.get_habit(later.id).unwrap().unwrap().completions, vec![99]);
}

#[test]
fn delete_cascades_completions_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::new(&conn);

    let habit = Habit::new("Water", HabitIcon::placeholder(), 0);
    repo.create_habit(&habit).unwrap();
    repo.record_completion(habit.id, 10).unwrap();
    repo.delete_habit(habit.id).unwrap();

    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM habit_completions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphans, 0);
    assert!(matches!(
        repo.delete_habit(habit.id),
        Err(RepoError::NotFound(id)) if id == habit.id
    ));
    assert!(matches!(
        repo.record_completion(habit.id, 11),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn update_missing_habit_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::new(&conn);

    let habit = Habit::new("ghost", HabitIcon::placeholder(), 0);
    assert!(matches!(
        repo.update_habit(&habit),
        Err(RepoError::NotFound(id)) if id == habit.id
    ));
}

#[test]
fn blank_name_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::new(&conn);

    let habit = Habit::new("   ", HabitIcon::placeholder(), 0);
    assert!(matches!(
        repo.create_habit(&habit),
        Err(RepoError::Validation(ModelValidationError::EmptyName))
    ));
}

#[test]
fn malformed_color_reads_as_fallback_but_bad_icon_kind_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHabitRepository::new(&conn);

    let habit = Habit::new("Paint", HabitIcon::placeholder(), 0);
    repo.create_habit(&habit).unwrap();
    conn.execute(
        "UPDATE habits SET color_hex = 'not-a-color' WHERE uuid = ?1;",
        [habit.id.to_string()],
    )
    .unwrap();
    let loaded = repo.get_habit(habit.id).unwrap().unwrap();
    assert_eq!(loaded.color.as_hex(), HabitColor::FALLBACK_HEX);

    conn.execute(
        "INSERT INTO habits (uuid, name, icon_kind, icon_value, created_at)
         VALUES (?1, 'broken', 'symbol', 'x', 0);",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "UPDATE habits SET icon_kind = 'bitmap' WHERE name = 'broken';",
        [],
    )
    .unwrap();
    assert!(matches!(repo.list_habits(), Err(RepoError::InvalidData(_))));
}

#[test]
fn toggle_today_appends_then_removes_only_todays_marks() {
    let conn = open_db_in_memory().unwrap();
    let service = HabitService::new(SqliteHabitRepository::new(&conn));
    let calendar = DayCalendar::utc();
    let today = day(2026, 10, 19);
    let yesterday = day(2026, 10, 18);

    let habit = service
        .create_habit(&HabitDraft::new("Meditate", "🧘"), noon(&calendar, yesterday))
        .unwrap();
    service
        .repo()
        .record_completion(habit.id, noon(&calendar, yesterday))
        .unwrap();

    let done = service
        .toggle_today(habit.id, &calendar, noon(&calendar, today))
        .unwrap();
    assert!(done.completed_today);
    assert!(done.habit.is_completed_today(&calendar, noon(&calendar, today)));
    assert_eq!(done.habit.current_streak(&calendar, today), 2);

    // A second completion later the same day is also cleared by the next toggle.
    service
        .repo()
        .record_completion(habit.id, noon(&calendar, today) + 3_600_000)
        .unwrap();
    let undone = service
        .toggle_today(habit.id, &calendar, noon(&calendar, today) + 7_200_000)
        .unwrap();
    assert!(!undone.completed_today);
    assert!(!undone.habit.is_completed_today(&calendar, noon(&calendar, today)));
    assert_eq!(undone.habit.completions, vec![noon(&calendar, yesterday)]);
    assert_eq!(undone.habit.current_streak(&calendar, today), 1);
}

#[test]
fn edit_keeps_history_and_validates_color() {
    let conn = open_db_in_memory().unwrap();
    let service = HabitService::new(SqliteHabitRepository::new(&conn));

    let habit = service
        .create_habit(&HabitDraft::new("Walk", "figure.walk"), 0)
        .unwrap();
    service.repo().record_completion(habit.id, 42).unwrap();

    let draft = HabitDraft {
        color: Some("#ff8800".to_string()),
        reminder: Some(ReminderTime::parse("7:05").unwrap()),
        ..HabitDraft::new("Evening walk", "🚶")
    };
    let edited = service.edit_habit(habit.id, &draft).unwrap();
    assert_eq!(edited.name, "Evening walk");
    assert_eq!(edited.icon, HabitIcon::Glyph("🚶".to_string()));
    assert_eq!(edited.color.as_hex(), "FF8800");
    assert_eq!(edited.completions, vec![42]);

    let bad = HabitDraft {
        color: Some("orange".to_string()),
        ..HabitDraft::new("Walk", "")
    };
    assert!(matches!(
        service.edit_habit(habit.id, &bad),
        Err(ServiceError::Validation(ModelValidationError::InvalidColor(_)))
    ));
    assert!(matches!(
        service.edit_habit(Uuid::new_v4(), &draft),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn icon_classification_is_decided_at_creation() {
    assert_eq!(HabitIcon::from_input(""), HabitIcon::placeholder());
    assert_eq!(
        HabitIcon::from_input(" flame.fill "),
        HabitIcon::Symbol("flame.fill".to_string())
    );
    assert_eq!(HabitIcon::from_input("⭐️"), HabitIcon::Glyph("⭐️".to_string()));
    assert_eq!(
        HabitIcon::from_input("Drink Water"),
        HabitIcon::Glyph("Drink Water".to_string())
    );
}

#[test]
fn reminder_time_parsing_rejects_out_of_range_values() {
    assert_eq!(ReminderTime::parse("08:00").unwrap().minute_of_day(), 480);
    assert!(ReminderTime::parse("24:00").is_err());
    assert!(ReminderTime::parse("12:60").is_err());
    assert!(ReminderTime::parse("noon").is_err());
}
