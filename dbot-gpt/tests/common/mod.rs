//! Test doubles for dbot-gpt integration tests: a recording [`dbot_core::Bot`] and a scripted
//! [`llm_client::LlmClient`]. No network.

#![allow(dead_code)]

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Bot, Chat, DbotError, Message, Result, SentMessage, TextFormat, User};
use llm_client::{ChatMessage, CompletionParams, LlmClient, StreamChunk, StreamChunkCallback};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One outgoing call seen by [`MockBot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Send { text: String, format: TextFormat },
    Edit { message_id: String, text: String, format: TextFormat },
}

impl Sent {
    pub fn text(&self) -> &str {
        match self {
            Sent::Send { text, .. } | Sent::Edit { text, .. } => text,
        }
    }
}

/// Records sends and edits; message ids count up from 100.
#[derive(Default)]
pub struct MockBot {
    calls: Mutex<Vec<Sent>>,
    next_id: AtomicUsize,
    fail_sends: bool,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Sent> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts of every plain-text send (command replies, guards, errors).
    pub fn plain_replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Sent::Send {
                    text,
                    format: TextFormat::Plain,
                } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Texts of every edit, in order.
    pub fn edits(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Sent::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str, format: TextFormat) -> Result<SentMessage> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        if self.fail_sends {
            return Err(DbotError::Bot("Forbidden: bot was blocked by the user".to_string()));
        }
        self.calls.lock().unwrap().push(Sent::Send {
            text: text.to_string(),
            format,
        });
        let id = 100 + self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(SentMessage {
            chat_id: chat.id,
            message_id: id.to_string(),
            text: text.to_string(),
        })
    }

    async fn edit_message(
        &self,
        _chat: &Chat,
        message_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.calls.lock().unwrap().push(Sent::Edit {
            message_id: message_id.to_string(),
            text: text.to_string(),
            format,
        });
        Ok(())
    }
}

/// What the scripted backend answers.
pub enum Script {
    /// Deltas, each delivered `gap` after the previous one.
    Reply { deltas: Vec<String>, gap: Duration },
    /// Fails after delivering the given deltas.
    Fail { deltas: Vec<String> },
}

/// Scripted completion backend that records every request.
pub struct ScriptedLlm {
    script: Script,
    requests: Mutex<Vec<(Vec<ChatMessage>, CompletionParams, bool)>>,
}

impl ScriptedLlm {
    pub fn reply(deltas: &[&str], gap: Duration) -> Self {
        Self::new(Script::Reply {
            deltas: deltas.iter().map(|d| d.to_string()).collect(),
            gap,
        })
    }

    pub fn fail(deltas: &[&str]) -> Self {
        Self::new(Script::Fail {
            deltas: deltas.iter().map(|d| d.to_string()).collect(),
        })
    }

    fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// (messages, params, streamed) of every request.
    pub fn requests(&self) -> Vec<(Vec<ChatMessage>, CompletionParams, bool)> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, messages: Vec<ChatMessage>, params: &CompletionParams, streamed: bool) {
        self.requests
            .lock()
            .unwrap()
            .push((messages, params.clone(), streamed));
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn get_llm_response_with_messages(
        &self,
        messages: Vec<ChatMessage>,
        params: &CompletionParams,
    ) -> AnyResult<String> {
        self.record(messages, params, false);
        match &self.script {
            Script::Reply { deltas, .. } => Ok(deltas.concat()),
            Script::Fail { .. } => anyhow::bail!("backend unavailable"),
        }
    }

    async fn get_llm_response_stream_with_messages(
        &self,
        messages: Vec<ChatMessage>,
        params: &CompletionParams,
        callback: &mut StreamChunkCallback,
    ) -> AnyResult<String> {
        self.record(messages, params, true);
        let (deltas, gap, fail) = match &self.script {
            Script::Reply { deltas, gap } => (deltas, *gap, false),
            Script::Fail { deltas } => (deltas, Duration::ZERO, true),
        };
        let mut full = String::new();
        for (i, delta) in deltas.iter().enumerate() {
            if !gap.is_zero() {
                tokio::time::sleep(gap).await;
            }
            full.push_str(delta);
            callback(StreamChunk {
                content: delta.clone(),
                done: i + 1 == deltas.len(),
            })
            .await?;
        }
        if fail {
            anyhow::bail!("Stream error: connection reset");
        }
        Ok(full)
    }
}

pub fn text_message(chat_id: i64, username: &str, content: &str) -> Message {
    Message {
        id: "1".to_string(),
        user: User {
            id: chat_id,
            username: Some(username.to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: chat_id,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: "text".to_string(),
        created_at: Utc::now(),
    }
}

pub fn non_text_message(chat_id: i64, username: &str) -> Message {
    Message {
        content: String::new(),
        message_type: "other".to_string(),
        ..text_message(chat_id, username, "")
    }
}
