//! Discord text limits and small reply formatting helpers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Truncation, pluralisation and progress bar helpers for goal replies

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;
/// Discord embed field name limit
pub const FIELD_NAME_LIMIT: usize = 256;
/// Maximum number of fields Discord accepts on one embed
pub const MAX_EMBED_FIELDS: usize = 25;

/// Truncate text to `limit` bytes on a UTF-8 boundary, adding an ellipsis if cut
pub fn truncate_to(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit.saturating_sub(3); // Room for "..."
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

pub fn truncate_for_message(text: &str) -> String {
    truncate_to(text, MESSAGE_LIMIT)
}

pub fn truncate_for_field_name(text: &str) -> String {
    truncate_to(text, FIELD_NAME_LIMIT)
}

/// `1 day`, `2 days`, `0 goals`
pub fn pluralize(count: usize, word: &str) -> String {
    format!("{} {}{}", count, word, if count == 1 { "" } else { "s" })
}

/// Text progress bar such as `🟩🟩🟩⬜⬜ 60.0%`
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!(
        "{}{} {:.1}%",
        "🟩".repeat(filled),
        "⬜".repeat(width - filled),
        ratio * 100.0
    )
}
