//! Goal error taxonomy
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the goal store, analytics and reminder delivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GoalError {
    /// A 1-based position outside the user's current goal list
    #[error("invalid goal position {position} (user has {len} goals)")]
    InvalidIndex { position: i64, len: usize },

    /// Progress requested for a user with no goals
    #[error("no goals yet")]
    NoGoals,

    /// Streak requested for a user with no completed goals
    #[error("no completed goals yet")]
    NoCompletions,

    /// Backing file could not be written (or read, when not recoverable)
    #[error("failed to persist goals to {path}: {message}")]
    Persistence { path: PathBuf, message: String },

    /// Reminder delivery to a user failed
    #[error("failed to notify user {user_id}: {message}")]
    Notification { user_id: String, message: String },
}

impl GoalError {
    /// Short reply shown to the Discord user for this error
    pub fn user_message(&self) -> &'static str {
        match self {
            GoalError::InvalidIndex { .. } => "Invalid task number.",
            GoalError::NoGoals => "You haven't set any goals yet. Use /add_goal to get started!",
            GoalError::NoCompletions => "You haven't completed any goals yet. Keep pushing!",
            GoalError::Persistence { .. } => {
                "❌ Sorry, I couldn't save your goals right now. Please try again in a moment."
            }
            GoalError::Notification { .. } => "❌ Sorry, I couldn't reach that user.",
        }
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, GoalError::Persistence { .. })
    }
}
