//! Slash commands: /reset, /model, /streaming, /info.
//!
//! Commands reply in plain text and end the chain. Anything else (including unknown commands)
//! falls through to the chat handler.

use async_trait::async_trait;
use dbot_core::{Bot, Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::models::GptModel;
use crate::session::{SessionStore, MAX_DIALOG_MESSAGES};

pub const BOT_DISPLAY_NAME: &str = "Private ChatGPT bot";

/// Command list published to Telegram on start (name, description).
pub const BOT_COMMANDS: [(&str, &str); 4] = [
    ("reset", "Reset dialog"),
    ("model", "Select GPT model"),
    ("streaming", "Toggle streaming mode"),
    ("info", "Show bot info"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
    Model,
    Streaming,
    Info,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "reset" => Some(Command::Reset),
            "model" => Some(Command::Model),
            "streaming" => Some(Command::Streaming),
            "info" => Some(Command::Info),
            _ => None,
        }
    }
}

/// Splits `/name@bot args` into the command and its trimmed argument.
///
/// A `@suffix` naming another bot is not ours; when `bot_username` is unknown any suffix is accepted.
pub fn parse_command<'a>(text: &'a str, bot_username: Option<&str>) -> Option<(Command, &'a str)> {
    let rest = text.trim_start().strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let name = match head.split_once('@') {
        Some((name, target)) => {
            if let Some(me) = bot_username {
                if !target.eq_ignore_ascii_case(me) {
                    return None;
                }
            }
            name
        }
        None => head,
    };
    Command::from_name(name).map(|c| (c, args))
}

pub struct CommandHandler {
    bot: Arc<dyn Bot>,
    sessions: Arc<SessionStore>,
    bot_username: Option<String>,
}

impl CommandHandler {
    pub fn new(bot: Arc<dyn Bot>, sessions: Arc<SessionStore>, bot_username: Option<String>) -> Self {
        Self {
            bot,
            sessions,
            bot_username,
        }
    }

    /// Applies the command to the chat's session and returns the reply text.
    pub fn execute(&self, chat_id: i64, command: Command, args: &str) -> String {
        match command {
            Command::Reset => {
                self.sessions.with_session(chat_id, |s| s.reset_dialog());
                "Context was reset".to_string()
            }
            Command::Model => self.model_command(chat_id, args),
            Command::Streaming => self.streaming_command(chat_id, args),
            Command::Info => self.info(chat_id),
        }
    }

    fn model_command(&self, chat_id: i64, args: &str) -> String {
        if args.is_empty() {
            let current = self.sessions.with_session(chat_id, |s| s.model);
            let mut lines = vec![format!("Current model: {}", current), "Available models:".to_string()];
            lines.extend(GptModel::ALL.iter().map(|m| format!("- {}", m)));
            lines.push("Use /model <name> to switch".to_string());
            return lines.join("\n");
        }
        let Some(model) = GptModel::parse(args) else {
            return format!("Unknown model: {}", args);
        };
        self.sessions.with_session(chat_id, |s| {
            if s.model == model {
                format!("Already using {}", model)
            } else {
                s.model = model;
                format!("Switched to {}", model)
            }
        })
    }

    fn streaming_command(&self, chat_id: i64, args: &str) -> String {
        let requested = match args.to_ascii_lowercase().as_str() {
            "on" | "enable" | "true" => Some(true),
            "off" | "disable" | "false" => Some(false),
            _ => None,
        };
        let enabled = self.sessions.with_session(chat_id, |s| {
            s.streaming = requested.unwrap_or(!s.streaming);
            s.streaming
        });
        if enabled {
            "Streaming enabled".to_string()
        } else {
            "Streaming disabled".to_string()
        }
    }

    fn info(&self, chat_id: i64) -> String {
        let session = self.sessions.snapshot(chat_id);
        [
            format!("Bot: {}", BOT_DISPLAY_NAME),
            format!("GPT model: {}", session.model.id()),
            format!("Streaming enabled: {}", session.streaming),
            format!(
                "Context size: {} messages (max {})",
                session.dialog_messages.len(),
                MAX_DIALOG_MESSAGES
            ),
            format!("Temperature: {}", session.temperature),
            format!("Top P: {}", session.top_p),
        ]
        .join("\n")
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.is_text() {
            return Ok(HandlerResponse::Continue);
        }
        let Some((command, args)) = parse_command(&message.content, self.bot_username.as_deref())
        else {
            return Ok(HandlerResponse::Continue);
        };
        info!(command = ?command, user_id = message.user.id, "step: command");
        let reply = self.execute(message.chat.id, command, args);
        self.bot.reply_to(message, &reply).await?;
        Ok(HandlerResponse::Reply(reply))
    }
}
