//! Goal embed builders for Discord responses
//!
//! Shared embed construction so every goal reply has the same shape:
//! title, accent colour, encouraging footer.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial creation

use serenity::builder::CreateEmbed;

/// Accent colour for neutral and positive replies
pub const COLOR_GREEN: u32 = 0x00ff00;
/// Accent colour for celebrations (completions, streaks)
pub const COLOR_GOLD: u32 = 0xffff00;

/// Build a goal-styled embed: title, accent colour, footer text.
///
/// Callers add fields or a description on the returned embed.
pub fn goal_embed(title: &str, color: u32, footer: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed.title(title);
    embed.color(color);
    embed.footer(|f| f.text(footer));
    embed
}
