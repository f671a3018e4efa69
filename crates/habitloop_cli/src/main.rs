//! Command-line host for the habit bookkeeping core.
//!
//! Every invocation behaves like one app activation: the session greets the
//! day, runs the requested action, then pumps queued events to stdout.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use habitloop_core::db::open_db;
use habitloop_core::{
    default_log_level, init_logging, load_config_or_default, CoreEvent, EventKind,
    HabitDraft, HabitLoop, ReminderTime, ResetOutcome, SystemClock,
};
use log::info;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "habitloop")]
#[command(about = "Habit and to-do tracker", version)]
struct Cli {
    #[arg(long, default_value = "./habitloop.sqlite3")]
    db: PathBuf,

    /// TOML configuration file; defaults apply when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run only the activation pass.
    Activate,
    Habit {
        #[command(subcommand)]
        command: HabitCommand,
    },
    Todo {
        #[command(subcommand)]
        command: TodoCommand,
    },
    /// Today's completion rate and streaks.
    Stats,
    /// Achievement catalog with unlock state.
    Achievements,
}

impl Command {
    fn label(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Habit { .. } => "habit",
            Self::Todo { .. } => "todo",
            Self::Stats => "stats",
            Self::Achievements => "achievements",
        }
    }
}

#[derive(Debug, Subcommand)]
enum HabitCommand {
    Add(HabitArgs),
    List,
    /// Toggle today's completion.
    Toggle { id: Uuid },
    Edit {
        id: Uuid,
        #[command(flatten)]
        args: HabitArgs,
    },
    Remove { id: Uuid },
}

#[derive(Debug, Args)]
struct HabitArgs {
    name: String,
    /// Symbol name (e.g. `flame.fill`) or literal glyph.
    #[arg(long, default_value = "")]
    icon: String,
    /// Six-digit hex color.
    #[arg(long)]
    color: Option<String>,
    /// Daily reminder time, `HH:MM`.
    #[arg(long)]
    remind: Option<String>,
}

impl HabitArgs {
    fn to_draft(&self) -> Result<HabitDraft> {
        let reminder = self
            .remind
            .as_deref()
            .map(ReminderTime::parse)
            .transpose()?;
        Ok(HabitDraft {
            color: self.color.clone(),
            reminder,
            ..HabitDraft::new(self.name.as_str(), self.icon.as_str())
        })
    }
}

#[derive(Debug, Subcommand)]
enum TodoCommand {
    Add { title: String },
    List,
    Toggle { id: Uuid },
    Remove { id: Uuid },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli
        .config
        .as_ref()
        .map(load_config_or_default)
        .unwrap_or_default();

    if let Some(log_dir) = &cli.log_dir {
        let level = config
            .logging
            .level
            .as_deref()
            .unwrap_or_else(|| default_log_level());
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| anyhow!("log directory must be valid UTF-8"))?;
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let mut session = HabitLoop::new(&conn, &config, SystemClock);
    run(&cli.command, &mut session)
}

fn run(command: &Command, session: &mut HabitLoop<'_>) -> Result<()> {
    info!("event=cli_command module=cli status=start command={}", command.label());
    session
        .bus_mut()
        .subscribe(EventKind::AchievementUnlocked, |event| {
            if let CoreEvent::AchievementUnlocked(achievement) = event {
                println!(
                    "Achievement unlocked: {} ({})",
                    achievement.name, achievement.description
                );
            }
        });

    let report = session.activate();
    if let ResetOutcome::NewDay { previous, day, .. } = &report.reset {
        println!("New day {day} (last visit {previous})");
    }

    // Unlocks queued by activation are announced even when the command fails.
    let result = execute(command, session, report.seeded_sample_data);
    session.dispatch_events();
    result
}

fn execute(command: &Command, session: &mut HabitLoop<'_>, seeded_sample_data: bool) -> Result<()> {
    match command {
        Command::Activate => {
            if seeded_sample_data {
                println!("Added sample habit and to-do");
            }
        }
        Command::Habit { command } => run_habit(command, session)?,
        Command::Todo { command } => run_todo(command, session)?,
        Command::Stats => {
            let stats = session.statistics()?;
            println!(
                "{} of {} habits done today ({:.0}%)",
                stats.completed_today,
                stats.total_habits,
                stats.completion_rate * 100.0
            );
            for (rank, entry) in stats.leaderboard.iter().enumerate() {
                println!("#{} {} - {} day(s)", rank + 1, entry.name, entry.streak);
            }
        }
        Command::Achievements => {
            for status in session.achievement_overview() {
                let mark = if status.unlocked { "x" } else { " " };
                println!(
                    "[{mark}] {:<14} {} - {}",
                    status.achievement.id, status.achievement.name, status.achievement.description
                );
            }
        }
    }
    Ok(())
}

fn run_habit(command: &HabitCommand, session: &mut HabitLoop<'_>) -> Result<()> {
    match command {
        HabitCommand::Add(args) => {
            let habit = session.create_habit(&args.to_draft()?)?;
            println!("{}", habit.id);
        }
        HabitCommand::List => {
            let calendar = session.calendar();
            let today = session.today();
            for habit in session.list_habits()? {
                let mark = if habit.is_completed_on(&calendar, today) {
                    "x"
                } else {
                    " "
                };
                let reminder = habit
                    .reminder
                    .map(|time| format!(" @{time}"))
                    .unwrap_or_default();
                println!(
                    "[{mark}] {} {} {} streak={}{}",
                    habit.id,
                    habit.icon.value(),
                    habit.name,
                    habit.current_streak(&calendar, today),
                    reminder
                );
            }
        }
        HabitCommand::Toggle { id } => {
            let outcome = session.toggle_habit_today(*id)?;
            let state = if outcome.completed_today {
                "done"
            } else {
                "not done"
            };
            println!("{} {state} today", outcome.habit.name);
        }
        HabitCommand::Edit { id, args } => {
            let habit = session.edit_habit(*id, &args.to_draft()?)?;
            println!("{}", habit.id);
        }
        HabitCommand::Remove { id } => session.delete_habit(*id)?,
    }
    Ok(())
}

fn run_todo(command: &TodoCommand, session: &mut HabitLoop<'_>) -> Result<()> {
    match command {
        TodoCommand::Add { title } => {
            let item = session.create_todo(title)?;
            println!("{}", item.id);
        }
        TodoCommand::List => {
            for item in session.list_todos()? {
                let mark = if item.is_completed { "x" } else { " " };
                println!("[{mark}] {} {}", item.id, item.title);
            }
        }
        TodoCommand::Toggle { id } => {
            let item = session.toggle_todo(*id)?;
            let state = if item.is_completed { "done" } else { "open" };
            println!("{} {state}", item.title);
        }
        TodoCommand::Remove { id } => session.delete_todo(*id)?,
    }
    Ok(())
}
