//! Runtime configuration loaded from the environment
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release with store and scheduler settings

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATA_FILE: &str = "user_goals.json";
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORE_IO_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_STORE_SAVE_RETRIES: u32 = 3;

/// Top-level bot configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub discord_guild_id: Option<String>,
    pub data_file: PathBuf,
    pub log_level: String,
    pub reminder_interval_secs: u64,
    pub notify_timeout_secs: u64,
    pub store_io_timeout_secs: u64,
    pub store_save_retries: u32,
}

/// Settings consumed by `GoalStore`
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub io_timeout: Duration,
    pub save_retries: u32,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_timeout: Duration::from_secs(DEFAULT_STORE_IO_TIMEOUT_SECS),
            save_retries: DEFAULT_STORE_SAVE_RETRIES,
        }
    }
}

/// Settings consumed by `ReminderScheduler`
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub period: Duration,
    pub dispatch_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(DEFAULT_REMINDER_INTERVAL_SECS),
            dispatch_timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_BOT_TOKEN")
            .or_else(|| lookup("DISCORD_TOKEN"))
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("Bot token not found! Set DISCORD_BOT_TOKEN in your .env file."))?;

        let discord_guild_id = lookup("DISCORD_GUILD_ID").filter(|id| !id.trim().is_empty());

        let data_file = lookup("GOALS_DATA_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let reminder_interval_secs = parse_or(
            &lookup,
            "REMINDER_INTERVAL_SECS",
            DEFAULT_REMINDER_INTERVAL_SECS,
        )?;
        if reminder_interval_secs == 0 {
            return Err(anyhow!("REMINDER_INTERVAL_SECS must be greater than 0"));
        }

        let notify_timeout_secs =
            parse_or(&lookup, "NOTIFY_TIMEOUT_SECS", DEFAULT_NOTIFY_TIMEOUT_SECS)?;
        let store_io_timeout_secs =
            parse_or(&lookup, "STORE_IO_TIMEOUT_SECS", DEFAULT_STORE_IO_TIMEOUT_SECS)?;
        let store_save_retries: u32 =
            parse_or(&lookup, "STORE_SAVE_RETRIES", DEFAULT_STORE_SAVE_RETRIES)?;

        Ok(Config {
            discord_token,
            discord_guild_id,
            data_file,
            log_level,
            reminder_interval_secs,
            notify_timeout_secs,
            store_io_timeout_secs,
            store_save_retries: store_save_retries.max(1),
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            path: self.data_file.clone(),
            io_timeout: Duration::from_secs(self.store_io_timeout_secs),
            save_retries: self.store_save_retries,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            period: Duration::from_secs(self.reminder_interval_secs),
            dispatch_timeout: Duration::from_secs(self.notify_timeout_secs),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid value for {key}: {raw}")),
        _ => Ok(default),
    }
}
