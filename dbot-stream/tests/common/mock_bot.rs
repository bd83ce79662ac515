//! Mock implementation of [`dbot_core::Bot`] for coalescer tests.
//!
//! Records every send/edit with its start time, simulates latency, can fail the send or queue
//! edit errors, and tracks how many calls were in flight at once.

use async_trait::async_trait;
use dbot_core::{Bot, Chat, DbotError, Result, SentMessage, TextFormat};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Send,
    Edit,
}

/// One recorded remote call.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct CallRecord {
    pub kind: CallKind,
    pub chat_id: i64,
    pub message_id: Option<String>,
    pub text: String,
    pub format: TextFormat,
    pub started_at: Instant,
}

pub struct RecordingBot {
    latency: Duration,
    fail_send: bool,
    edit_errors: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<CallRecord>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingBot {
    /// Bot answering every call after 10 ms; the created message gets id `"1"`.
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(10))
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            fail_send: false,
            edit_errors: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Bot whose send always fails.
    pub fn failing_send() -> Self {
        Self {
            fail_send: true,
            ..Self::new()
        }
    }

    /// The next edit fails with `message`.
    pub fn push_edit_error(&self, message: &str) {
        self.edit_errors
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts of all edit calls, in order.
    pub fn edits(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == CallKind::Edit)
            .map(|c| c.text)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn remote_call(&self, record: CallRecord) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(record);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(
        &self,
        chat: &Chat,
        text: &str,
        format: TextFormat,
    ) -> Result<SentMessage> {
        self.remote_call(CallRecord {
            kind: CallKind::Send,
            chat_id: chat.id,
            message_id: None,
            text: text.to_string(),
            format,
            started_at: Instant::now(),
        })
        .await;
        if self.fail_send {
            return Err(DbotError::Bot(
                "Forbidden: bot was blocked by the user".to_string(),
            ));
        }
        Ok(SentMessage {
            chat_id: chat.id,
            message_id: "1".to_string(),
            text: text.to_string(),
        })
    }

    async fn edit_message(
        &self,
        chat: &Chat,
        message_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<()> {
        self.remote_call(CallRecord {
            kind: CallKind::Edit,
            chat_id: chat.id,
            message_id: Some(message_id.to_string()),
            text: text.to_string(),
            format,
            started_at: Instant::now(),
        })
        .await;
        let error = self.edit_errors.lock().unwrap().pop_front();
        match error {
            Some(message) => Err(DbotError::Bot(message)),
            None => Ok(()),
        }
    }
}
