//! Day-based bookkeeping over habit history.
//!
//! # Responsibility
//! - Derive consecutive-day streaks from completion history.
//! - Greet each new calendar day exactly once per activation cycle.
//! - Unlock achievements when their thresholds are first crossed.
//!
//! # Invariants
//! - Bookkeeping never mutates habit history.
//! - Failures degrade to "skip and retry later"; nothing here panics or
//!   surfaces a user-visible error.

pub mod achievements;
pub mod daily_reset;
pub mod streak;
