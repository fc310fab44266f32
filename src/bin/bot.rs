use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::watch;

use goalbot::commands::{register_global_commands, register_guild_commands, CommandHandler};
use goalbot::core::Config;
use goalbot::features::goals::GoalStore;
use goalbot::features::reminders::{DiscordNotifier, ReminderScheduler};

struct Handler {
    command_handler: Arc<CommandHandler>,
    guild_id: Option<GuildId>,
}

impl Handler {
    fn new(command_handler: CommandHandler, guild_id: Option<GuildId>) -> Self {
        Handler {
            command_handler: Arc::new(command_handler),
            guild_id,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 Logged in as {}", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        // Register slash commands - use guild commands for development (instant), global for production
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = interaction {
            if let Err(e) = self
                .command_handler
                .handle_slash_command(&ctx, &command)
                .await
            {
                error!(
                    "Error handling slash command '{}': {}",
                    command.data.name, e
                );

                let error_message =
                    "❌ Sorry, I encountered an error processing your command. Please try again.";
                let _ = command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| message.content(error_message))
                    })
                    .await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting goal bot...");

    let store = GoalStore::open(config.store_config()).await;
    let command_handler = CommandHandler::new(store.clone());

    // Parse guild ID if provided for development mode
    let guild_id = match config.discord_guild_id.as_deref() {
        Some(raw) => match raw.parse::<u64>() {
            Ok(id) => Some(GuildId(id)),
            Err(_) => {
                warn!("Ignoring invalid DISCORD_GUILD_ID: {raw}");
                None
            }
        },
        None => None,
    };

    let handler = Handler::new(command_handler, guild_id);

    let intents = GatewayIntents::GUILDS | GatewayIntents::DIRECT_MESSAGES;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    // Start the reminder scheduler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let notifier = Arc::new(DiscordNotifier::new(client.cache_and_http.http.clone()));
    let scheduler = ReminderScheduler::new(store, notifier, config.scheduler_config());
    let scheduler_task = tokio::spawn(async move {
        scheduler.run(shutdown_rx).await;
    });

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {e}");
            return;
        }
        info!("🛑 Shutdown requested, stopping...");
        shard_manager.lock().await.shutdown_all().await;
    });

    info!("Establishing WebSocket connection to Discord gateway...");
    let result = client.start().await;

    // Gateway is down (shutdown or failure): stop the scheduler and let its current tick finish
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        error!("Reminder scheduler task failed: {e}");
    }

    if let Err(why) = result {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
