//! # dbot-gpt
//!
//! Private ChatGPT bot for Telegram.
//!
//! Handler chain: [`AccessGuard`] (allow list) → [`CommandHandler`] (/reset, /model, /streaming,
//! /info) → [`ChatHandler`] (completion shown through a [`dbot_stream::MessageHandle`]).

mod access;
mod chat;
mod cli;
mod commands;
mod config;
mod models;
mod session;

pub use access::{AccessGuard, MSG_ACCESS_DENIED};
pub use chat::{ChatHandler, INDICATOR, MSG_COMPLETION_ERROR, MSG_INVALID_INPUT, MSG_LLM_FAILED};
pub use cli::{Cli, Commands};
pub use commands::{parse_command, Command, CommandHandler, BOT_COMMANDS, BOT_DISPLAY_NAME};
pub use config::{parse_allowed_users, BotConfig, DEFAULT_OPENAI_BASE_URL};
pub use models::GptModel;
pub use session::{SessionData, SessionStore, DEFAULT_SESSION_TTL, MAX_DIALOG_MESSAGES};

use anyhow::Result;
use dbot_core::{init_tracing, Bot};
use dbot_stream::EditConfig;
use dbot_telegram::{run_repl, TelegramBotAdapter};
use handler_chain::HandlerChain;
use llm_client::{LlmClient, OpenAILlmClient};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::Requester;
use tracing::{info, instrument, warn};

/// How often idle sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Assembles the handler chain: guard, commands, chat.
pub fn build_handler_chain(
    config: &BotConfig,
    bot: Arc<dyn Bot>,
    llm_client: Arc<dyn LlmClient>,
    sessions: Arc<SessionStore>,
    bot_username: Option<String>,
    edit_config: EditConfig,
) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(AccessGuard::new(
            config.allowed_users.iter().cloned(),
            bot.clone(),
        )))
        .add_handler(Arc::new(CommandHandler::new(
            bot.clone(),
            sessions.clone(),
            bot_username,
        )))
        .add_handler(Arc::new(ChatHandler::new(
            bot,
            llm_client,
            sessions,
            edit_config,
        )))
}

/// Main entry: init logging, validate config, build the chain, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file.as_deref())?;

    let teloxide_bot = config.telegram_config().build_bot()?;
    let bot_username = match teloxide_bot.get_me().await {
        Ok(me) => me.user.username.clone(),
        Err(e) => {
            warn!(error = %e, "get_me failed; /cmd@name suffixes will not be checked");
            None
        }
    };

    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let llm_client: Arc<dyn LlmClient> = Arc::new(
        OpenAILlmClient::with_base_url(config.openai_api_key.clone(), config.openai_base_url.clone())
            .with_system_prompt_opt(config.system_prompt.clone()),
    );
    let sessions = Arc::new(SessionStore::new(config.session_ttl));

    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sweeper.evict_expired();
            if removed > 0 {
                info!(removed = removed, "Expired sessions evicted");
            }
        }
    });

    let chain = build_handler_chain(
        &config,
        bot,
        llm_client,
        sessions,
        bot_username.clone(),
        config.edit_config(),
    );

    info!(
        username = ?bot_username,
        allowed_users = config.allowed_users.len(),
        min_edit_interval_ms = config.edit_min_interval.as_millis() as u64,
        "Bot started successfully"
    );

    run_repl(teloxide_bot, chain, &BOT_COMMANDS).await
}
