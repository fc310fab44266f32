//! # Reminders Feature
//!
//! Periodic DM reminders for goals that are still open.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod notifier;
pub mod scheduler;

pub use notifier::{DiscordNotifier, Notifier};
pub use scheduler::{reminder_text, ReminderScheduler, TickReport};
