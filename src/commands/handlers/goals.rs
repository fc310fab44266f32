//! Goal command handlers
//!
//! Handles: add_goal, view_goals, complete_goal, progress, streak, clear_completed
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use log::{debug, warn};
use serenity::builder::CreateEmbed;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::commands::slash::goals::{MAX_DURATION_MINUTES, MAX_TASK_LENGTH};
use crate::commands::slash::{get_integer_option, get_string_option};
use crate::core::embeds::{goal_embed, COLOR_GOLD, COLOR_GREEN};
use crate::core::{
    pluralize, progress_bar, truncate_for_field_name, GoalError, MAX_EMBED_FIELDS,
};
use crate::features::analytics::{calculate_progress, calculate_streak, Progress, Streak};
use crate::features::goals::{Goal, GoalStore};

/// Width of the text progress bar in /progress replies
const PROGRESS_BAR_WIDTH: usize = 10;

const COMMAND_NAMES: &[&str] = &[
    "add_goal",
    "view_goals",
    "complete_goal",
    "progress",
    "streak",
    "clear_completed",
];

/// Handler for goal tracking commands, backed by the injected store
#[derive(Clone)]
pub struct GoalsHandler {
    store: GoalStore,
}

impl GoalsHandler {
    pub fn new(store: GoalStore) -> Self {
        Self { store }
    }

    /// Slash command names this handler answers
    pub fn command_names() -> &'static [&'static str] {
        COMMAND_NAMES
    }

    pub fn handles(name: &str) -> bool {
        COMMAND_NAMES.contains(&name)
    }

    /// Run one goal command and send its reply
    pub async fn handle(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();
        let reply = match command.data.name.as_str() {
            "add_goal" => self.add_goal(command, &user_id).await?,
            "view_goals" => self.view_goals(&user_id).await,
            "complete_goal" => self.complete_goal(command, &user_id).await?,
            "progress" => self.progress(&user_id).await,
            "streak" => self.streak(&user_id).await,
            "clear_completed" => self.clear_completed(&user_id).await,
            other => return Err(anyhow!("Not a goal command: {other}")),
        };

        reply.send(serenity_ctx, command).await
    }
}

/// What a goal command answers with
enum Reply {
    Text(String),
    Embed(CreateEmbed),
}

impl Reply {
    fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }

    /// Plain reply for an error; persistence failures are also logged
    fn from_error(user_id: &str, err: &GoalError) -> Self {
        if err.is_persistence() {
            warn!("Command for user {user_id} not saved: {err}");
        } else {
            debug!("Command for user {user_id} rejected: {err}");
        }
        Reply::text(err.user_message())
    }

    async fn send(self, serenity_ctx: &Context, command: &ApplicationCommandInteraction) -> Result<()> {
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| match self {
                        Reply::Text(content) => msg.content(content),
                        Reply::Embed(embed) => msg.add_embed(embed),
                    })
            })
            .await?;
        Ok(())
    }
}

impl GoalsHandler {
    /// Handle /add_goal - append a goal and confirm it
    async fn add_goal(
        &self,
        command: &ApplicationCommandInteraction,
        user_id: &str,
    ) -> Result<Reply> {
        let duration = get_integer_option(&command.data.options, "duration")
            .ok_or_else(|| anyhow!("Missing duration parameter"))?;
        let task = get_string_option(&command.data.options, "task")
            .ok_or_else(|| anyhow!("Missing task parameter"))?;

        let Some(duration) = validate_duration(duration) else {
            return Ok(Reply::text(format!(
                "❌ Duration must be between 1 and {MAX_DURATION_MINUTES} minutes."
            )));
        };
        let task = task.trim();
        if task.is_empty() {
            return Ok(Reply::text("❌ Please describe the task for your goal."));
        }
        if task.chars().count() > MAX_TASK_LENGTH {
            return Ok(Reply::text(format!(
                "❌ Goal descriptions are limited to {MAX_TASK_LENGTH} characters."
            )));
        }

        Ok(match self.store.add(user_id, task, duration).await {
            Ok(goal) => Reply::Embed(added_embed(&goal)),
            Err(e) => Reply::from_error(user_id, &e),
        })
    }

    /// Handle /view_goals - numbered list with status icons
    async fn view_goals(&self, user_id: &str) -> Reply {
        let goals = self.store.list(user_id).await;
        if goals.is_empty() {
            return Reply::from_error(user_id, &GoalError::NoGoals);
        }

        let mut embed = goal_embed("Your Goals", COLOR_GREEN, "Keep pushing forward! 🚀");
        for (name, value) in goal_list_fields(&goals) {
            embed.field(name, value, false);
        }
        Reply::Embed(embed)
    }

    /// Handle /complete_goal - mark by 1-based position
    async fn complete_goal(
        &self,
        command: &ApplicationCommandInteraction,
        user_id: &str,
    ) -> Result<Reply> {
        let position = get_integer_option(&command.data.options, "task_number")
            .ok_or_else(|| anyhow!("Missing task_number parameter"))?;

        Ok(match self.store.complete_at(user_id, position).await {
            Ok(goal) => {
                let mut embed = goal_embed(
                    "Goal Completed!",
                    COLOR_GOLD,
                    "Great job! Keep up the momentum! 🌟",
                );
                embed.description(format!("🎉 {}", goal.task));
                Reply::Embed(embed)
            }
            Err(e) => Reply::from_error(user_id, &e),
        })
    }

    /// Handle /progress - completed vs total
    async fn progress(&self, user_id: &str) -> Reply {
        let (completed, total) = self.store.summary(user_id).await;
        match calculate_progress(completed, total) {
            Ok(progress) => Reply::Embed(progress_embed(&progress)),
            Err(e) => Reply::from_error(user_id, &e),
        }
    }

    /// Handle /streak - current and longest day-streak
    async fn streak(&self, user_id: &str) -> Reply {
        if self.store.list(user_id).await.is_empty() {
            return Reply::from_error(user_id, &GoalError::NoGoals);
        }

        let times = self.store.completion_times(user_id).await;
        match calculate_streak(&times) {
            Ok(streak) => {
                let mut embed =
                    goal_embed("Goal Completion Streak", COLOR_GOLD, "Consistency is key! 🗝️");
                for (name, value) in streak_fields(&streak) {
                    embed.field(name, value, true);
                }
                Reply::Embed(embed)
            }
            Err(e) => Reply::from_error(user_id, &e),
        }
    }

    /// Handle /clear_completed - drop completed goals, renumbering the rest
    async fn clear_completed(&self, user_id: &str) -> Reply {
        if self.store.user_snapshot(user_id).await.is_none() {
            return Reply::text("You don't have any goals set.");
        }

        match self.store.clear_completed(user_id).await {
            Ok(cleared) => {
                let mut embed = goal_embed(
                    "Completed Goals Cleared",
                    COLOR_GREEN,
                    "Ready for new challenges! 🚀",
                );
                embed.field("Cleared", format!("🧹 {}", pluralize(cleared, "goal")), true);
                Reply::Embed(embed)
            }
            Err(e) => Reply::from_error(user_id, &e),
        }
    }
}

/// Positive minute counts within the command's accepted range
fn validate_duration(duration: i64) -> Option<u32> {
    if (1..=MAX_DURATION_MINUTES).contains(&duration) {
        u32::try_from(duration).ok()
    } else {
        None
    }
}

fn added_embed(goal: &Goal) -> CreateEmbed {
    let mut embed = goal_embed("Goal Added", COLOR_GREEN, "You've got this! 💪");
    embed.description(format!("🎯 {}", goal.task));
    embed.field("Duration", format!("⏱️ {} minutes", goal.duration_minutes), true);
    embed
}

fn progress_embed(progress: &Progress) -> CreateEmbed {
    let mut embed = goal_embed("Goal Progress", COLOR_GREEN, "Every step counts! 👣");
    embed.description(progress_bar(progress.ratio, PROGRESS_BAR_WIDTH));
    embed.field(
        "Completed",
        format!("{}/{} goals", progress.completed, progress.total),
        true,
    );
    embed.field("Remaining", progress.remaining().to_string(), true);
    embed
}

/// Embed fields for the goal list, capped at Discord's field limit
fn goal_list_fields(goals: &[Goal]) -> Vec<(String, String)> {
    let shown = if goals.len() > MAX_EMBED_FIELDS {
        MAX_EMBED_FIELDS - 1
    } else {
        goals.len()
    };

    let mut fields: Vec<(String, String)> = goals
        .iter()
        .take(shown)
        .enumerate()
        .map(|(idx, goal)| {
            let status = if goal.completed { "✅" } else { "⏳" };
            (
                truncate_for_field_name(&format!("Goal {}: {}", idx + 1, goal.task)),
                format!("{status} Duration: {} mins", goal.duration_minutes),
            )
        })
        .collect();

    if shown < goals.len() {
        let hidden = goals.len() - shown;
        fields.push((
            "…".to_string(),
            format!("and {} more goal{}", hidden, if hidden == 1 { "" } else { "s" }),
        ));
    }
    fields
}

fn streak_fields(streak: &Streak) -> Vec<(String, String)> {
    vec![
        (
            "Current Streak".to_string(),
            format!("🔥 {}", pluralize(streak.current as usize, "day")),
        ),
        (
            "Longest Streak".to_string(),
            format!("🏆 {}", pluralize(streak.longest as usize, "day")),
        ),
    ]
}
