//! # Core Module
//!
//! Configuration, error taxonomy and Discord reply helpers shared by every feature.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod config;
pub mod embeds;
pub mod error;
pub mod response;

// Re-export commonly used items
pub use config::{Config, SchedulerConfig, StoreConfig};
pub use error::GoalError;
pub use response::{
    pluralize, progress_bar, truncate_for_field_name, truncate_for_message, truncate_to,
    FIELD_NAME_LIMIT, MAX_EMBED_FIELDS, MESSAGE_LIMIT,
};
