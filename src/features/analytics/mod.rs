//! # Analytics Feature
//!
//! Completion progress and day-streaks, computed on demand from a user's goals.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod progress;
pub mod streak;

pub use progress::{calculate_progress, Progress};
pub use streak::{calculate_streak, streak_from_dates, Streak};
