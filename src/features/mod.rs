//! # Features
//!
//! - **goals**: persistent per-user goal store
//! - **reminders**: periodic DM reminders for open goals
//! - **analytics**: progress ratio and completion streaks

pub mod analytics;
pub mod goals;
pub mod reminders;

pub use analytics::{calculate_progress, calculate_streak, Progress, Streak};
pub use goals::{Goal, GoalStore, UserCollection};
pub use reminders::{DiscordNotifier, Notifier, ReminderScheduler};
