//! Slash command dispatch
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Dispatch for goal commands

use anyhow::Result;
use log::{debug, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use uuid::Uuid;

use crate::commands::GoalsHandler;
use crate::features::goals::GoalStore;

/// Routes incoming slash commands to the goal handler
#[derive(Clone)]
pub struct CommandHandler {
    goals: GoalsHandler,
}

impl CommandHandler {
    pub fn new(store: GoalStore) -> Self {
        info!(
            "Handling {} slash commands",
            GoalsHandler::command_names().len()
        );
        Self {
            goals: GoalsHandler::new(store),
        }
    }

    pub fn handles(&self, name: &str) -> bool {
        GoalsHandler::handles(name)
    }

    pub async fn handle_slash_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let user_id = command.user.id.to_string();
        let guild_id = command
            .guild_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "DM".to_string());

        info!(
            "[{}] 📥 Slash command received | Command: {} | User: {} | Guild: {}",
            request_id, command.data.name, user_id, guild_id
        );

        if !self.handles(&command.data.name) {
            warn!("[{request_id}] Unknown slash command: {}", command.data.name);
            command
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message.content("❓ Unknown command.")
                        })
                })
                .await?;
            return Ok(());
        }

        self.goals.handle(ctx, command).await?;

        debug!("[{request_id}] ✅ Slash command {} completed", command.data.name);
        Ok(())
    }
}
