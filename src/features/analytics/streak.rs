//! # Feature: Completion Streaks
//!
//! Day-streaks over goal completion timestamps. Timestamps are reduced to
//! calendar dates and walked in ascending order:
//!
//! - next day: the current streak grows and may raise the longest streak
//! - a gap of two or more days: the current streak restarts at 1
//! - same day: nothing changes
//!
//! Several completions on one day therefore neither extend nor break a
//! streak.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::GoalError;

/// Current and longest streak, in days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

/// Compute the streak from completion timestamps in any order.
///
/// Returns `NoCompletions` when there are none.
pub fn calculate_streak(completed_at: &[NaiveDateTime]) -> Result<Streak, GoalError> {
    let mut sorted = completed_at.to_vec();
    sorted.sort();
    let dates: Vec<NaiveDate> = sorted.iter().map(|ts| ts.date()).collect();
    streak_from_dates(&dates)
}

/// Walk dates already sorted ascending
pub fn streak_from_dates(dates: &[NaiveDate]) -> Result<Streak, GoalError> {
    let (first, rest) = dates.split_first().ok_or(GoalError::NoCompletions)?;

    let mut current = 1;
    let mut longest = 1;
    let mut last = *first;

    for &date in rest {
        let delta = (date - last).num_days();
        if delta == 1 {
            current += 1;
            longest = longest.max(current);
        } else if delta > 1 {
            current = 1;
        }
        last = date;
    }

    Ok(Streak { current, longest })
}
