//! # Command System
//!
//! Slash command (/) handling for Discord interactions.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod handlers;
pub mod slash;

// Re-export the CommandHandler from the handler module
pub use crate::command_handler::CommandHandler;

pub use handlers::GoalsHandler;

// Re-export commonly used items from submodules
pub use slash::{
    create_slash_commands, get_integer_option, get_string_option, register_global_commands,
    register_guild_commands,
};
