//! # Goals Feature
//!
//! Per-user goal records, their on-disk encoding and the shared, persistent store.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod codec;
pub mod model;
pub mod store;

pub use model::{local_now, Goal, UserCollection};
pub use store::{next_reminder_after, DueReminder, GoalStore};
