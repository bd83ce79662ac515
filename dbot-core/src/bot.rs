//! Bot abstraction for sending and editing messages.
//!
//! [`Bot`] is transport-agnostic; dbot-telegram implements it via teloxide and tests substitute
//! recording mocks.

use crate::error::{DbotError, Result};
use crate::types::{Chat, Message};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Display format requested for an outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFormat {
    /// Sent as-is; no markup is interpreted.
    Plain,
    /// Telegram MarkdownV2. The caller guarantees the text is fully escaped.
    MarkdownV2,
}

/// Remote confirmation of a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub chat_id: i64,
    /// Transport-specific id (Telegram numeric string); used for later edits.
    pub message_id: String,
    /// Text as the remote stored it.
    pub text: String,
}

/// Abstraction for sending and editing messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends `text` to the chat in the given format and returns the created message.
    async fn send_message(&self, chat: &Chat, text: &str, format: TextFormat)
        -> Result<SentMessage>;
    /// Replaces the text of an already-sent message.
    async fn edit_message(
        &self,
        chat: &Chat,
        message_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<()>;
    /// Sends a plain-text reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text, TextFormat::Plain)
            .await
            .map(|_| ())
    }
}

/// Parses a message id string into an i32. Used by edit implementations.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| DbotError::Bot(format!("Invalid message_id for edit: {}", s)))
}
