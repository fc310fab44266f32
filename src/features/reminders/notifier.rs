//! Reminder delivery
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Notifier trait with Discord DM delivery

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::id::UserId;
use std::sync::Arc;

use crate::core::truncate_for_message;

/// Sends a text message to a user by id
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: &str, text: &str) -> Result<()>;
}

/// Delivers notifications as Discord direct messages
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, user_id: &str, text: &str) -> Result<()> {
        let id: u64 = user_id
            .parse()
            .map_err(|_| anyhow!("not a Discord user id: {user_id}"))?;

        let http: &Http = &self.http;
        let dm = UserId(id).create_dm_channel(http).await?;
        dm.say(http, truncate_for_message(text)).await?;
        debug!("Sent DM to user {user_id}");
        Ok(())
    }
}
