use chrono::NaiveDate;
use habitloop_core::db::open_db_in_memory;
use habitloop_core::settings::{write_last_visit_day, SqliteSettingsStore};
use habitloop_core::{
    AchievementId, CoreConfig, CoreEvent, EventKind, FixedClock, HabitDraft, HabitId, HabitLoop,
    ReminderPlan, ReminderScheduler, ResetOutcome, ServiceError, TodoPolicy, TodoTransitionError,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReminderCall {
    Schedule(HabitId, String),
    Cancel(HabitId),
}

#[derive(Clone, Default)]
struct RecordingScheduler {
    calls: Rc<RefCell<Vec<ReminderCall>>>,
}

impl ReminderScheduler for RecordingScheduler {
    fn schedule(&mut self, plan: &ReminderPlan) {
        self.calls
            .borrow_mut()
            .push(ReminderCall::Schedule(plan.habit_id, plan.time.to_string()));
    }

    fn cancel(&mut self, habit_id: HabitId) {
        self.calls.borrow_mut().push(ReminderCall::Cancel(habit_id));
    }
}

fn start_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn no_seed_config() -> CoreConfig {
    let mut config = CoreConfig::default();
    config.seed.sample_data = false;
    config
}

fn collect_unlocks(session: &mut HabitLoop<'_, &FixedClock>) -> Rc<RefCell<Vec<AchievementId>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    session
        .bus_mut()
        .subscribe(EventKind::AchievementUnlocked, move |event| {
            if let CoreEvent::AchievementUnlocked(achievement) = event {
                sink.borrow_mut().push(achievement.id);
            }
        });
    seen
}

#[test]
fn first_activation_seeds_sample_data_once() {
    let conn = open_db_in_memory().unwrap();
    let clock = FixedClock::at(start_day(), 9, 0);
    let scheduler = RecordingScheduler::default();
    let calls = Rc::clone(&scheduler.calls);
    let mut session =
        HabitLoop::new(&conn, &CoreConfig::default(), &clock).with_reminder_scheduler(scheduler);
    let seen = collect_unlocks(&mut session);

    let report = session.activate();
    assert!(report.seeded_sample_data);
    assert_eq!(report.reset, ResetOutcome::FirstRun { day: start_day() });
    assert_eq!(report.unlocked, vec![AchievementId::FirstHabit]);

    let habits = session.list_habits().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(session.list_todos().unwrap().len(), 1);
    assert_eq!(
        *calls.borrow(),
        vec![ReminderCall::Schedule(habits[0].id, "08:00".to_string())]
    );

    // Delivery waits for the host loop.
    assert!(seen.borrow().is_empty());
    assert_eq!(session.dispatch_events(), 1);
    assert_eq!(*seen.borrow(), vec![AchievementId::FirstHabit]);

    let again = session.activate();
    assert!(!again.seeded_sample_data);
    assert_eq!(again.reset, ResetOutcome::SameDay { day: start_day() });
    assert!(again.unlocked.is_empty());
    assert_eq!(session.list_habits().unwrap().len(), 1);
}

#[test]
fn seven_day_streak_unlocks_through_daily_toggles() {
    let conn = open_db_in_memory().unwrap();
    let clock = FixedClock::at(start_day(), 7, 30);
    let mut session = HabitLoop::new(&conn, &no_seed_config(), &clock);
    let seen = collect_unlocks(&mut session);

    session.activate();
    let habit = session
        .create_habit(&HabitDraft::new("Journal", "book"))
        .unwrap();

    for day_index in 0..7 {
        if day_index > 0 {
            clock.advance_days(1);
            assert!(session.activate().reset.performed());
        }
        let outcome = session.toggle_habit_today(habit.id).unwrap();
        assert!(outcome.completed_today);
    }

    session.dispatch_events();
    assert_eq!(
        *seen.borrow(),
        vec![AchievementId::FirstHabit, AchievementId::Streak7]
    );

    let stats = session.statistics().unwrap();
    assert_eq!(stats.completed_today, 1);
    assert_eq!(stats.completion_rate, 1.0);
    assert_eq!(stats.leaderboard[0].streak, 7);
}

#[test]
fn new_day_resyncs_reminders_and_announces_day() {
    let conn = open_db_in_memory().unwrap();
    let clock = FixedClock::at(start_day(), 10, 0);
    let scheduler = RecordingScheduler::default();
    let calls = Rc::clone(&scheduler.calls);
    let mut session =
        HabitLoop::new(&conn, &no_seed_config(), &clock).with_reminder_scheduler(scheduler);

    session.activate();
    let draft = HabitDraft {
        reminder: Some(habitloop_core::ReminderTime::new(6, 45).unwrap()),
        ..HabitDraft::new("Yoga", "🧘")
    };
    let habit = session.create_habit(&draft).unwrap();
    calls.borrow_mut().clear();

    let days = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&days);
    session.bus_mut().subscribe(EventKind::DayStarted, move |event| {
        if let CoreEvent::DayStarted { day, .. } = event {
            sink.borrow_mut().push(*day);
        }
    });

    clock.advance_days(2);
    let report = session.activate();
    assert!(report.reset.performed());
    assert_eq!(
        *calls.borrow(),
        vec![ReminderCall::Schedule(habit.id, "06:45".to_string())]
    );
    session.dispatch_events();
    assert_eq!(*days.borrow(), vec![session.today()]);

    session.delete_habit(habit.id).unwrap();
    assert_eq!(calls.borrow().last(), Some(&ReminderCall::Cancel(habit.id)));
}

#[test]
fn unlocks_survive_restart_without_reannouncing() {
    let conn = open_db_in_memory().unwrap();
    let clock = FixedClock::at(start_day(), 12, 0);
    {
        let mut session = HabitLoop::new(&conn, &no_seed_config(), &clock);
        session.activate();
        for i in 0..6 {
            session
                .create_habit(&HabitDraft::new(format!("habit {i}"), ""))
                .unwrap();
        }
        assert_eq!(session.unlocked_achievements().len(), 2);
    }

    let mut restarted = HabitLoop::new(&conn, &no_seed_config(), &clock);
    let report = restarted.activate();
    assert!(report.unlocked.is_empty());
    assert_eq!(restarted.bus_mut().pending_len(), 0);
    let overview = restarted.achievement_overview();
    assert_eq!(overview.len(), 5);
    assert!(overview[0].unlocked && overview[1].unlocked);
    assert!(!overview[2].unlocked);
}

#[test]
fn todo_policy_comes_from_config() {
    let conn = open_db_in_memory().unwrap();
    let clock = FixedClock::at(start_day(), 12, 0);

    let mut config = no_seed_config();
    config.todos.policy = TodoPolicy::OneWay;
    let mut one_way = HabitLoop::new(&conn, &config, &clock);
    let item = one_way.create_todo("Renew passport").unwrap();
    assert!(one_way.toggle_todo(item.id).unwrap().is_completed);
    assert!(matches!(
        one_way.toggle_todo(item.id),
        Err(ServiceError::Transition(TodoTransitionError::ReopenNotAllowed(id))) if id == item.id
    ));

    config.todos.policy = TodoPolicy::Toggle;
    let mut toggle = HabitLoop::new(&conn, &config, &clock);
    assert!(!toggle.toggle_todo(item.id).unwrap().is_completed);
    let renamed = toggle.rename_todo(item.id, "  Renew passport early ").unwrap();
    assert_eq!(renamed.title, "Renew passport early");
    toggle.delete_todo(item.id).unwrap();
    assert!(toggle.list_todos().unwrap().is_empty());
}

#[test]
fn stored_yesterday_visit_triggers_new_day_on_activation() {
    let conn = open_db_in_memory().unwrap();
    let clock = FixedClock::at(start_day(), 8, 0);
    let yesterday = start_day().pred_opt().unwrap();
    write_last_visit_day(&SqliteSettingsStore::new(&conn), yesterday).unwrap();

    let mut session = HabitLoop::new(&conn, &no_seed_config(), &clock);
    match session.activate().reset {
        ResetOutcome::NewDay { day, previous, .. } => {
            assert_eq!(day, start_day());
            assert_eq!(previous, yesterday);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn failed_sample_todo_does_not_reseed_habit() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_todos BEFORE INSERT ON todos
         BEGIN SELECT RAISE(ABORT, 'todos unavailable'); END;",
    )
    .unwrap();
    let clock = FixedClock::at(start_day(), 9, 0);

    let mut session = HabitLoop::new(&conn, &CoreConfig::default(), &clock);
    assert!(session.activate().seeded_sample_data);
    assert_eq!(session.list_habits().unwrap().len(), 1);
    assert!(session.list_todos().unwrap().is_empty());

    conn.execute_batch("DROP TRIGGER reject_todos;").unwrap();
    let mut restarted = HabitLoop::new(&conn, &CoreConfig::default(), &clock);
    assert!(!restarted.activate().seeded_sample_data);
    assert_eq!(restarted.list_habits().unwrap().len(), 1);
}
