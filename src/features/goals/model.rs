//! Goal record and timestamp helpers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Delay between creating a goal and its first reminder
pub const FIRST_REMINDER_DELAY_MINUTES: i64 = 30;
/// Delay between successive reminders for the same goal
pub const REMINDER_INTERVAL_HOURS: i64 = 1;

/// All users' goals keyed by user id, in the order users were first seen.
///
/// A missing key is an empty list.
pub type UserCollection = IndexMap<String, Vec<Goal>>;

/// A user-owned task with a duration, completion state and reminder schedule.
///
/// Field order matches the on-disk record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub task: String,
    /// Minutes; always positive
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    pub completed: bool,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(
        rename = "reminder",
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub next_reminder_at: Option<NaiveDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub completed_at: Option<NaiveDateTime>,
}

impl Goal {
    pub fn new(task: impl Into<String>, duration_minutes: u32, now: NaiveDateTime) -> Self {
        Self {
            task: task.into(),
            duration_minutes,
            completed: false,
            created_at: now,
            next_reminder_at: Some(now + Duration::minutes(FIRST_REMINDER_DELAY_MINUTES)),
            completed_at: None,
        }
    }

    pub fn complete(&mut self, now: NaiveDateTime) {
        self.completed = true;
        self.completed_at = Some(now);
        self.next_reminder_at = None;
    }

    pub fn is_reminder_due(&self, now: NaiveDateTime) -> bool {
        !self.completed && self.next_reminder_at.is_some_and(|at| at <= now)
    }

    /// Drop state that cannot coexist with the completion flag.
    ///
    /// Older data files keep `reminder` on completed goals.
    pub fn normalize(&mut self) {
        if self.completed {
            self.next_reminder_at = None;
        }
    }
}

/// Current local wall-clock time at microsecond precision, the resolution timestamps are stored at
pub fn local_now() -> NaiveDateTime {
    truncate_to_micros(Local::now().naive_local())
}

fn truncate_to_micros(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_nanosecond(value.nanosecond() / 1_000 * 1_000)
        .unwrap_or(value)
}

/// ISO-8601 timestamps as naive local date-times.
///
/// Written as `YYYY-MM-DDTHH:MM:SS` plus `.ffffff` when the microsecond part
/// is non-zero. Parsing also accepts RFC 3339 strings with an offset.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &NaiveDateTime) -> String {
        if value.nanosecond() / 1_000 == 0 {
            value.format("%Y-%m-%dT%H:%M:%S").to_string()
        } else {
            value.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
        }
    }

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        raw.parse::<NaiveDateTime>()
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_str(&super::format(v)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp: {raw}"))
                }),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn test_new_goal_schedules_first_reminder() {
        let now = at(1, 9, 0);
        let goal = Goal::new("Read", 25, now);

        assert!(!goal.completed);
        assert_eq!(goal.created_at, now);
        assert_eq!(goal.next_reminder_at, Some(at(1, 9, 30)));
        assert!(goal.completed_at.is_none());
    }

    #[test]
    fn test_complete_clears_reminder() {
        let mut goal = Goal::new("Read", 25, at(1, 9, 0));
        goal.complete(at(1, 10, 0));

        assert!(goal.completed);
        assert_eq!(goal.completed_at, Some(at(1, 10, 0)));
        assert!(goal.next_reminder_at.is_none());
        assert!(!goal.is_reminder_due(at(2, 0, 0)));
    }

    #[test]
    fn test_reminder_due_boundary() {
        let goal = Goal::new("Read", 25, at(1, 9, 0));
        assert!(!goal.is_reminder_due(at(1, 9, 29)));
        assert!(goal.is_reminder_due(at(1, 9, 30)));
    }

    #[test]
    fn test_timestamp_format_matches_isoformat() {
        assert_eq!(timestamp::format(&at(1, 9, 5)), "2024-05-01T09:05:00");

        let precise = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(9, 5, 0, 120)
            .unwrap();
        assert_eq!(timestamp::format(&precise), "2024-05-01T09:05:00.000120");
    }

    #[test]
    fn test_timestamp_parse_variants() {
        let expected = at(1, 9, 5);
        assert_eq!(timestamp::parse("2024-05-01T09:05:00"), Some(expected));
        assert_eq!(timestamp::parse("2024-05-01 09:05:00"), Some(expected));
        assert_eq!(timestamp::parse("2024-05-01T09:05:00+02:00"), Some(expected));
        assert!(timestamp::parse("2024-05-01T09:05:00.123456").is_some());
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_deserialize_legacy_record() {
        let raw = r#"{
            "task": "Write report",
            "duration": 45,
            "completed": true,
            "created_at": "2024-05-01T09:00:00.500000",
            "reminder": "2024-05-01T09:30:00.500000",
            "completed_at": "2024-05-01T11:00:00"
        }"#;
        let mut goal: Goal = serde_json::from_str(raw).unwrap();
        assert_eq!(goal.duration_minutes, 45);
        assert!(goal.next_reminder_at.is_some());

        goal.normalize();
        assert!(goal.next_reminder_at.is_none());
        assert_eq!(goal.completed_at, Some(at(1, 11, 0)));
    }

    #[test]
    fn test_serialize_omits_absent_fields() {
        let goal = Goal::new("Read", 25, at(1, 9, 0));
        let json = serde_json::to_string(&goal).unwrap();
        assert_eq!(
            json,
            r#"{"task":"Read","duration":25,"completed":false,"created_at":"2024-05-01T09:00:00","reminder":"2024-05-01T09:30:00"}"#
        );
    }

    #[test]
    fn test_truncate_to_micros_drops_sub_microsecond_part() {
        let precise = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_nano_opt(9, 5, 0, 123_456_789)
            .unwrap();
        let truncated = truncate_to_micros(precise);
        assert_eq!(truncated.nanosecond(), 123_456_000);
        assert_eq!(timestamp::parse(&timestamp::format(&truncated)), Some(truncated));
    }

    #[test]
    fn test_local_now_survives_a_file_round_trip() {
        let now = local_now();
        assert_eq!(now.nanosecond() % 1_000, 0);
        assert_eq!(timestamp::parse(&timestamp::format(&now)), Some(now));

        let goal = Goal::new("Read", 25, now);
        let reloaded: Goal = serde_json::from_str(&serde_json::to_string(&goal).unwrap()).unwrap();
        assert_eq!(reloaded, goal);
    }
}
