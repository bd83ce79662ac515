//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code sends messages via Telegram; tests can substitute another Bot impl.

use async_trait::async_trait;
use dbot_core::{parse_message_id, Bot as CoreBot, Chat, DbotError, Result, SentMessage, TextFormat};
use teloxide::payloads::{EditMessageTextSetters, SendMessageSetters};
use teloxide::{
    prelude::*,
    types::{ChatId, MessageId, ParseMode},
};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements dbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

fn parse_mode(format: TextFormat) -> Option<ParseMode> {
    match format {
        TextFormat::Plain => None,
        TextFormat::MarkdownV2 => Some(ParseMode::MarkdownV2),
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str, format: TextFormat) -> Result<SentMessage> {
        let mut request = self.bot.send_message(ChatId(chat.id), text.to_string());
        if let Some(mode) = parse_mode(format) {
            request = request.parse_mode(mode);
        }
        let sent = request
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))?;
        debug!(chat_id = chat.id, message_id = %sent.id, "Message sent");
        Ok(SentMessage {
            chat_id: sent.chat.id.0,
            message_id: sent.id.to_string(),
            text: sent.text().unwrap_or(text).to_string(),
        })
    }

    async fn edit_message(
        &self,
        chat: &Chat,
        message_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<()> {
        let id = parse_message_id(message_id)?;
        let mut request = self
            .bot
            .edit_message_text(ChatId(chat.id), MessageId(id), text.to_string());
        if let Some(mode) = parse_mode(format) {
            request = request.parse_mode(mode);
        }
        request
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))?;
        Ok(())
    }
}
