//! Bot configuration loaded from the environment (after `.env` is read by the binary).

use anyhow::{Context, Result};
use dbot_stream::EditConfig;
use dbot_telegram::TelegramConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::session::DEFAULT_SESSION_TTL;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Everything the bot needs at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// Optional Telegram Bot API base URL (`TELEGRAM_API_URL` or `TELOXIDE_API_URL`).
    pub telegram_api_url: Option<String>,
    pub log_file: Option<String>,
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// Usernames allowed to talk to the bot.
    pub allowed_users: Vec<String>,
    /// Overrides the built-in system instructions when set.
    pub system_prompt: Option<String>,
    pub edit_min_interval: Duration,
    pub edit_retries: u32,
    pub session_ttl: Duration,
}

/// Splits an allow list on spaces, commas and semicolons, skipping empty items.
pub fn parse_allowed_users(raw: &str) -> Vec<String> {
    raw.split([' ', ',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

impl BotConfig {
    /// Loads from environment variables. `token`, when given, overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token.filter(|t| !t.trim().is_empty()) {
            Some(t) => t,
            None => non_empty_var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let telegram_api_url =
            non_empty_var("TELEGRAM_API_URL").or_else(|| non_empty_var("TELOXIDE_API_URL"));
        let log_file = non_empty_var("LOG_FILE");
        let openai_api_key = non_empty_var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_base_url =
            non_empty_var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        let allowed_users = env::var("ALLOWED_USERS")
            .map(|raw| parse_allowed_users(&raw))
            .context("ALLOWED_USERS not set")?;
        let system_prompt = non_empty_var("SYSTEM_PROMPT");
        let edit_min_interval = Duration::from_millis(parse_var(
            "EDIT_MIN_INTERVAL_MS",
            dbot_stream::DEFAULT_MIN_EDIT_INTERVAL.as_millis() as u64,
        )?);
        let edit_retries = parse_var("EDIT_RETRIES", 0u32)?;
        let session_ttl =
            Duration::from_secs(parse_var("SESSION_TTL_SECS", DEFAULT_SESSION_TTL.as_secs())?);

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            openai_api_key,
            openai_base_url,
            allowed_users,
            system_prompt,
            edit_min_interval,
            edit_retries,
            session_ttl,
        })
    }

    /// Rejects configurations the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_users.is_empty() {
            anyhow::bail!("ALLOWED_USERS is empty; nobody could use the bot");
        }
        Ok(())
    }

    pub fn telegram_config(&self) -> TelegramConfig {
        let mut telegram = TelegramConfig::with_token(self.bot_token.clone());
        telegram.telegram_api_url = self.telegram_api_url.clone();
        telegram
    }

    pub fn edit_config(&self) -> EditConfig {
        EditConfig::default()
            .with_min_interval(self.edit_min_interval)
            .with_edit_retries(self.edit_retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 11] = [
        "BOT_TOKEN",
        "TELEGRAM_API_URL",
        "TELOXIDE_API_URL",
        "LOG_FILE",
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "ALLOWED_USERS",
        "SYSTEM_PROMPT",
        "EDIT_MIN_INTERVAL_MS",
        "EDIT_RETRIES",
        "SESSION_TTL_SECS",
    ];

    fn set_required_env() {
        for key in KEYS {
            env::remove_var(key);
        }
        env::set_var("BOT_TOKEN", "test_token");
        env::set_var("OPENAI_API_KEY", "test_key");
        env::set_var("ALLOWED_USERS", "alice");
    }

    #[test]
    fn test_parse_allowed_users() {
        assert_eq!(
            parse_allowed_users("alice, bob;carol  dave"),
            vec!["alice", "bob", "carol", "dave"]
        );
        assert!(parse_allowed_users(" ,; ").is_empty());
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        set_required_env();

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token, "test_token");
        assert_eq!(config.openai_api_key, "test_key");
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.allowed_users, vec!["alice"]);
        assert!(config.telegram_api_url.is_none());
        assert!(config.log_file.is_none());
        assert!(config.system_prompt.is_none());
        assert_eq!(config.edit_min_interval, Duration::from_millis(250));
        assert_eq!(config.edit_retries, 0);
        assert_eq!(config.session_ttl, DEFAULT_SESSION_TTL);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_config_with_custom_values() {
        set_required_env();
        env::set_var("TELOXIDE_API_URL", "http://localhost:8081");
        env::set_var("LOG_FILE", "logs/bot.log");
        env::set_var("OPENAI_BASE_URL", "https://custom.api.com");
        env::set_var("ALLOWED_USERS", "alice,bob");
        env::set_var("SYSTEM_PROMPT", "Be brief.");
        env::set_var("EDIT_MIN_INTERVAL_MS", "1000");
        env::set_var("EDIT_RETRIES", "2");
        env::set_var("SESSION_TTL_SECS", "60");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.telegram_api_url.as_deref(), Some("http://localhost:8081"));
        assert_eq!(config.log_file.as_deref(), Some("logs/bot.log"));
        assert_eq!(config.openai_base_url, "https://custom.api.com");
        assert_eq!(config.allowed_users, vec!["alice", "bob"]);
        assert_eq!(config.system_prompt.as_deref(), Some("Be brief."));
        let edit = config.edit_config();
        assert_eq!(edit.min_interval, Duration::from_secs(1));
        assert_eq!(edit.edit_retries, 2);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(
            config.telegram_config().telegram_api_url.as_deref(),
            Some("http://localhost:8081")
        );
    }

    #[test]
    #[serial]
    fn test_load_config_with_override_token() {
        set_required_env();
        let config = BotConfig::load(Some("override_token".to_string())).unwrap();
        assert_eq!(config.bot_token, "override_token");
    }

    #[test]
    #[serial]
    fn test_missing_required_values_fail() {
        set_required_env();
        env::remove_var("ALLOWED_USERS");
        assert!(BotConfig::load(None).is_err());

        set_required_env();
        env::remove_var("OPENAI_API_KEY");
        assert!(BotConfig::load(None).is_err());

        set_required_env();
        env::remove_var("BOT_TOKEN");
        assert!(BotConfig::load(None).is_err());
    }

    #[test]
    #[serial]
    fn test_invalid_values_fail() {
        set_required_env();
        env::set_var("EDIT_MIN_INTERVAL_MS", "fast");
        assert!(BotConfig::load(None).is_err());

        set_required_env();
        env::set_var("ALLOWED_USERS", " ; ");
        let config = BotConfig::load(None).unwrap();
        assert!(config.validate().is_err());
    }
}
