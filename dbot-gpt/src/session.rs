//! Per-chat session state with an idle time-to-live.

use dashmap::DashMap;
use llm_client::{ChatMessage, CompletionParams};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::GptModel;

/// Dialog messages kept per chat; the oldest is dropped first.
pub const MAX_DIALOG_MESSAGES: usize = 5;

/// Default idle lifetime of a session: one year.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Settings and recent dialog of one chat.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub model: GptModel,
    pub streaming: bool,
    pub dialog_messages: VecDeque<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            model: GptModel::default(),
            streaming: true,
            dialog_messages: VecDeque::new(),
            temperature: 0.0,
            top_p: 0.2,
        }
    }
}

impl SessionData {
    pub fn add_dialog_message(&mut self, message: ChatMessage) {
        self.dialog_messages.push_back(message);
        while self.dialog_messages.len() > MAX_DIALOG_MESSAGES {
            self.dialog_messages.pop_front();
        }
    }

    pub fn reset_dialog(&mut self) {
        self.dialog_messages.clear();
    }

    /// Dialog in chronological order, ready for a completion request.
    pub fn dialog(&self) -> Vec<ChatMessage> {
        self.dialog_messages.iter().cloned().collect()
    }

    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams::new(self.model.id())
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
    }
}

struct SessionEntry {
    data: SessionData,
    last_access: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            data: SessionData::default(),
            last_access: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() > ttl
    }
}

/// Concurrent map of chat id to session. Chats never contend with each other.
pub struct SessionStore {
    sessions: DashMap<i64, SessionEntry>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Runs `f` on the chat's session, creating it (or resetting it when idle past the TTL).
    /// `f` must not touch the store.
    pub fn with_session<R>(&self, chat_id: i64, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut entry = self
            .sessions
            .entry(chat_id)
            .or_insert_with(SessionEntry::new);
        if entry.is_expired(self.ttl) {
            debug!(chat_id = chat_id, "Session expired; starting fresh");
            entry.data = SessionData::default();
        }
        entry.last_access = Instant::now();
        f(&mut entry.data)
    }

    /// Copy of the chat's current session.
    pub fn snapshot(&self, chat_id: i64) -> SessionData {
        self.with_session(chat_id, |s| s.clone())
    }

    /// Removes sessions idle past the TTL. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let keep = !entry.is_expired(self.ttl);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
