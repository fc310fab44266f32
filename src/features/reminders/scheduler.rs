//! # Feature: Reminder Scheduler
//!
//! Periodic scan for due goal reminders. Each tick copies the due set out of
//! the store, releases the lock, delivers every reminder with a per-message
//! timeout, then re-acquires the lock to push each goal's next reminder one
//! hour past the tick time. A failed or slow recipient never holds up the
//! rest of the tick.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use chrono::NaiveDateTime;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, timeout, MissedTickBehavior};

use super::notifier::Notifier;
use crate::core::{GoalError, SchedulerConfig};
use crate::features::goals::{local_now, next_reminder_after, GoalStore};

/// Outcome of one scheduler pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub due: usize,
    pub delivered: usize,
    pub failed: usize,
    pub rescheduled: usize,
}

pub fn reminder_text(task: &str) -> String {
    format!("⏰ Reminder: It's time to work on your goal: {task}")
}

pub struct ReminderScheduler {
    store: GoalStore,
    notifier: Arc<dyn Notifier>,
    config: SchedulerConfig,
}

impl ReminderScheduler {
    pub fn new(store: GoalStore, notifier: Arc<dyn Notifier>, config: SchedulerConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Tick every period until `shutdown` becomes true or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "⏰ Reminder scheduler started (every {:?})",
            self.config.period
        );

        let mut ticker = interval(self.config.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.tick().await;
                    if report.due > 0 {
                        info!(
                            "⏰ Reminder tick: {} due, {} delivered, {} failed, {} rescheduled",
                            report.due, report.delivered, report.failed, report.rescheduled
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("⏰ Reminder scheduler stopped");
    }

    pub async fn tick(&self) -> TickReport {
        self.tick_at(local_now()).await
    }

    pub async fn tick_at(&self, now: NaiveDateTime) -> TickReport {
        let due = self.store.due_reminders(now).await;
        let mut report = TickReport {
            due: due.len(),
            ..TickReport::default()
        };
        if due.is_empty() {
            debug!("No reminders due at {now}");
            return report;
        }

        for reminder in &due {
            match self.dispatch(&reminder.user_id, &reminder_text(&reminder.task)).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("{e}");
                    report.failed += 1;
                }
            }
        }

        report.rescheduled = match self.store.reschedule(&due, next_reminder_after(now)).await {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to commit rescheduled reminders: {e}");
                0
            }
        };

        report
    }

    async fn dispatch(&self, user_id: &str, text: &str) -> Result<(), GoalError> {
        match timeout(self.config.dispatch_timeout, self.notifier.notify(user_id, text)).await {
            Ok(Ok(())) => {
                debug!("Reminder delivered to user {user_id}");
                Ok(())
            }
            Ok(Err(e)) => Err(GoalError::Notification {
                user_id: user_id.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(GoalError::Notification {
                user_id: user_id.to_string(),
                message: format!("timed out after {:?}", self.config.dispatch_timeout),
            }),
        }
    }
}
