//! Static achievement catalog.
//!
//! # Invariants
//! - Catalog entries are immutable; only the set of unlocked ids is persisted.
//! - `CATALOG` order is the evaluation order of unlock rules.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable achievement identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstHabit,
    HabitMaster,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    PerfectWeek,
}

impl AchievementId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstHabit => "first_habit",
            Self::HabitMaster => "habit_master",
            Self::Streak7 => "streak_7",
            Self::Streak30 => "streak_30",
            Self::PerfectWeek => "perfect_week",
        }
    }

    /// Catalog entry for this id.
    pub fn definition(self) -> &'static Achievement {
        // Every id has exactly one catalog entry.
        match self {
            Self::FirstHabit => &CATALOG[0],
            Self::HabitMaster => &CATALOG[1],
            Self::Streak7 => &CATALOG[2],
            Self::Streak30 => &CATALOG[3],
            Self::PerfectWeek => &CATALOG[4],
        }
    }
}

impl Display for AchievementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "first_habit" => Ok(Self::FirstHabit),
            "habit_master" => Ok(Self::HabitMaster),
            "streak_7" => Ok(Self::Streak7),
            "streak_30" => Ok(Self::Streak30),
            "perfect_week" => Ok(Self::PerfectWeek),
            other => Err(format!("unknown achievement id `{other}`")),
        }
    }
}

/// Badge definition shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    /// Symbol name for the badge.
    pub icon: &'static str,
    /// Gradient stops, as color names.
    pub colors: &'static [&'static str],
}

pub const CATALOG: [Achievement; 5] = [
    Achievement {
        id: AchievementId::FirstHabit,
        name: "A New Beginning",
        description: "Create your first habit",
        icon: "plus.circle",
        colors: &["blue", "cyan"],
    },
    Achievement {
        id: AchievementId::HabitMaster,
        name: "Habit Master",
        description: "Create more than five habits",
        icon: "list.bullet.rectangle",
        colors: &["purple", "pink"],
    },
    Achievement {
        id: AchievementId::Streak7,
        name: "Rising Star",
        description: "Complete any habit seven days in a row",
        icon: "flame",
        colors: &["orange", "red"],
    },
    Achievement {
        id: AchievementId::Streak30,
        name: "Monthly Champion",
        description: "Complete any habit thirty days in a row",
        icon: "crown",
        colors: &["yellow", "orange"],
    },
    Achievement {
        id: AchievementId::PerfectWeek,
        name: "Perfect Week",
        description: "Complete every habit for a whole week",
        icon: "star.circle.fill",
        colors: &["green", "mint"],
    },
];
