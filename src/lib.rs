// Core layer - configuration, errors and shared reply helpers
pub mod core;

// Features layer - goal store, reminders, analytics
pub mod features;

// Application layer
pub mod command_handler;
pub mod commands;

pub use crate::core::{Config, GoalError};

pub use features::{
    // Analytics
    calculate_progress, calculate_streak, Progress, Streak,
    // Goals
    Goal, GoalStore, UserCollection,
    // Reminders
    DiscordNotifier, Notifier, ReminderScheduler,
};
