//! # Feature: Goal Progress
//!
//! Completion ratio for a user's goals. Rendering the ratio (text bar in the
//! Discord reply) lives in the command layer.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use crate::core::GoalError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `completed / total`, in `[0, 1]`
    pub ratio: f64,
}

impl Progress {
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    /// Completed and remaining shares, the two slices of a progress chart
    pub fn proportions(&self) -> (f64, f64) {
        (self.ratio, 1.0 - self.ratio)
    }
}

/// `NoGoals` when `total` is zero
pub fn calculate_progress(completed: usize, total: usize) -> Result<Progress, GoalError> {
    if total == 0 {
        return Err(GoalError::NoGoals);
    }
    let completed = completed.min(total);
    Ok(Progress {
        completed,
        total,
        ratio: completed as f64 / total as f64,
    })
}
