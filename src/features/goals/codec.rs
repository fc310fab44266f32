//! Backing-file encoding for the goal collection
//!
//! The file is a JSON object mapping user ids to arrays of goal records,
//! pretty-printed with 4-space indentation and ASCII-only output so files
//! written by earlier versions of the bot read and write back unchanged.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use super::model::{Goal, UserCollection};

/// A decoded backing file
#[derive(Debug, Default)]
pub struct Decoded {
    pub users: UserCollection,
    /// Goal records (or whole user entries) that could not be read and were left out
    pub skipped: usize,
}

/// Encode the collection into its on-disk text form
pub fn encode(users: &UserCollection) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    users.serialize(&mut ser)?;

    // serde_json only ever emits valid UTF-8
    let text = String::from_utf8_lossy(&buf);
    Ok(escape_non_ascii(&text))
}

/// Decode the on-disk text form, normalising legacy records.
///
/// Only a file that is not a JSON object is an error. A record that does not
/// fit the goal layout is skipped with a warning and counted in `skipped`, so
/// one bad entry never costs the other users their goals.
pub fn decode(text: &str) -> Result<Decoded, serde_json::Error> {
    let raw: IndexMap<String, Value> = serde_json::from_str(text)?;
    let mut decoded = Decoded::default();

    for (user_id, records) in raw {
        let Value::Array(records) = records else {
            warn!("Skipping goals for user {user_id}: expected a list");
            decoded.skipped += 1;
            continue;
        };

        let mut goals = Vec::with_capacity(records.len());
        for (idx, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Goal>(record) {
                Ok(mut goal) => {
                    goal.normalize();
                    goals.push(goal);
                }
                Err(e) => {
                    warn!("Skipping goal #{} for user {user_id}: {e}", idx + 1);
                    decoded.skipped += 1;
                }
            }
        }
        decoded.users.insert(user_id, goals);
    }

    Ok(decoded)
}

/// Replace every non-ASCII character with `\uXXXX` escapes (surrogate pairs above the BMP).
///
/// Non-ASCII characters only ever appear inside JSON strings in serializer output.
fn escape_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
