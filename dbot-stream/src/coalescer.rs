//! Lifecycle of one remote message: a send, then rate-limited edits.
//!
//! State lives behind a per-handle mutex. Issuing a remote call requires the committed state and
//! clears it in the same critical section; only the task that owns the call sets it again. That
//! transition is the only way to start a call, so no two calls on a handle overlap.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use dbot_core::{Bot, Chat, DbotError, TextFormat};
use dbot_markdown::transpile;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, error, info, instrument, warn};

use crate::config::EditConfig;
use crate::error::CoalescerError;
use crate::retry::{extract_retry_after_seconds, is_message_not_modified_error};

/// The in-flight remote call of a handle, or an already settled no-op.
///
/// Cloneable; every clone resolves to the same outcome. The call itself runs on a spawned task,
/// so dropping a `PendingEdit` never cancels it.
#[derive(Clone)]
pub struct PendingEdit {
    inner: Shared<BoxFuture<'static, Result<(), CoalescerError>>>,
}

impl PendingEdit {
    fn ready(outcome: Result<(), CoalescerError>) -> Self {
        Self {
            inner: futures::future::ready(outcome).boxed().shared(),
        }
    }

    fn spawn<F>(operation: F) -> Self
    where
        F: Future<Output = Result<(), CoalescerError>> + Send + 'static,
    {
        let task = tokio::spawn(operation);
        let inner = async move {
            task.await
                .unwrap_or_else(|e| Err(CoalescerError::TaskFailed(e.to_string())))
        }
        .boxed()
        .shared();
        Self { inner }
    }
}

impl Future for PendingEdit {
    type Output = Result<(), CoalescerError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

struct HandleState {
    /// Assigned once the initial send succeeds.
    message_id: Option<String>,
    /// True iff `text_sent` is believed to be the remote content and nothing is in flight.
    committed: bool,
    /// Plain (untranspiled) text last applied remotely.
    text_sent: String,
    pending: PendingEdit,
    /// Set when the initial send failed; every later update resolves to it.
    failure: Option<CoalescerError>,
}

struct HandleInner {
    bot: Arc<dyn Bot>,
    chat: Chat,
    config: EditConfig,
    state: Mutex<HandleState>,
}

/// One message in a remote chat, kept in sync with the latest requested text.
///
/// Cheap to clone; clones share state. Must be created inside a tokio runtime.
#[derive(Clone)]
pub struct MessageHandle {
    inner: Arc<HandleInner>,
}

impl MessageHandle {
    /// Sends `initial_text` (transpiled to MarkdownV2) and returns immediately.
    ///
    /// The handle is not committed until the send completes; [`Self::pending`] resolves then.
    /// A failed send is stored on the handle: that future and every later [`Self::update`]
    /// return it, and the handle never commits.
    pub fn create(
        bot: Arc<dyn Bot>,
        chat: Chat,
        initial_text: impl Into<String>,
        config: EditConfig,
    ) -> Self {
        let handle = Self {
            inner: Arc::new(HandleInner {
                bot,
                chat,
                config,
                state: Mutex::new(HandleState {
                    message_id: None,
                    committed: false,
                    text_sent: String::new(),
                    pending: PendingEdit::ready(Ok(())),
                    failure: None,
                }),
            }),
        };
        let mut state = handle.state();
        state.pending = PendingEdit::spawn(handle.clone().send_initial(initial_text.into()));
        drop(state);
        handle
    }

    /// Like [`Self::create`] but waits for the send, so a failure surfaces here.
    pub async fn send(
        bot: Arc<dyn Bot>,
        chat: Chat,
        initial_text: impl Into<String>,
        config: EditConfig,
    ) -> Result<Self, CoalescerError> {
        let handle = Self::create(bot, chat, initial_text, config);
        handle.pending().await?;
        Ok(handle)
    }

    /// Requests that the remote message show `desired_text`.
    ///
    /// - committed and text differs: issues one edit and returns it.
    /// - `guaranteed` and not committed: returns a future that waits for the in-flight call and
    ///   then retries this update, so the text is applied once nothing else is in flight.
    /// - otherwise: no remote call; returns the current pending operation (the text is dropped).
    pub fn update(&self, desired_text: impl Into<String>, guaranteed: bool) -> PendingEdit {
        let desired_text = desired_text.into();
        let mut state = self.state();

        if let Some(failure) = &state.failure {
            return PendingEdit::ready(Err(failure.clone()));
        }

        if guaranteed && !state.committed {
            let in_flight = state.pending.clone();
            drop(state);
            let handle = self.clone();
            return PendingEdit::spawn(async move {
                let _ = in_flight.await;
                handle.update(desired_text, true).await
            });
        }

        if state.committed && desired_text != state.text_sent {
            if let Some(message_id) = state.message_id.clone() {
                state.committed = false;
                let operation =
                    PendingEdit::spawn(self.clone().apply_edit(message_id, desired_text));
                state.pending = operation.clone();
                return operation;
            }
        }

        state.pending.clone()
    }

    /// The in-flight operation, or a settled no-op.
    pub fn pending(&self) -> PendingEdit {
        self.state().pending.clone()
    }

    pub fn is_committed(&self) -> bool {
        self.state().committed
    }

    /// Plain text last applied (or assumed applied) remotely.
    pub fn text_sent(&self) -> String {
        self.state().text_sent.clone()
    }

    pub fn message_id(&self) -> Option<String> {
        self.state().message_id.clone()
    }

    pub fn chat(&self) -> &Chat {
        &self.inner.chat
    }

    fn state(&self) -> MutexGuard<'_, HandleState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[instrument(skip(self, text), fields(chat_id = self.inner.chat.id))]
    async fn send_initial(self, text: String) -> Result<(), CoalescerError> {
        let rendered = transpile(&text);
        match self
            .inner
            .bot
            .send_message(&self.inner.chat, &rendered, TextFormat::MarkdownV2)
            .await
        {
            Ok(sent) => {
                info!(message_id = %sent.message_id, "Message created");
                let mut state = self.state();
                state.message_id = Some(sent.message_id);
                state.text_sent = text;
                state.committed = true;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to send message");
                let failure = CoalescerError::SendFailed(e.to_string());
                self.state().failure = Some(failure.clone());
                Err(failure)
            }
        }
    }

    /// Edits the message and holds the operation open for at least the minimum interval.
    /// Always commits `text`: a failed edit is logged and assumed applied.
    #[instrument(skip(self, text), fields(chat_id = self.inner.chat.id, text_len = text.len()))]
    async fn apply_edit(self, message_id: String, text: String) -> Result<(), CoalescerError> {
        let rendered = transpile(&text);
        let (outcome, ()) = tokio::join!(
            self.edit_with_retry(&message_id, &rendered),
            tokio::time::sleep(self.inner.config.min_interval),
        );
        if let Err(e) = outcome {
            warn!(error = %e, message_id = %message_id, "Failed to edit message; assuming applied");
        }
        let mut state = self.state();
        state.text_sent = text;
        state.committed = true;
        Ok(())
    }

    /// Treats "message is not modified" as success; retries up to `edit_retries` times, waiting
    /// for Retry-After when the error carries one.
    async fn edit_with_retry(&self, message_id: &str, rendered: &str) -> Result<(), DbotError> {
        let mut retries_left = self.inner.config.edit_retries;
        loop {
            match self
                .inner
                .bot
                .edit_message(&self.inner.chat, message_id, rendered, TextFormat::MarkdownV2)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => {
                    let error_str = e.to_string();
                    if is_message_not_modified_error(&error_str) {
                        debug!(message_id = %message_id, "Message not modified");
                        return Ok(());
                    }
                    if retries_left == 0 {
                        return Err(e);
                    }
                    retries_left -= 1;
                    let delay = extract_retry_after_seconds(&error_str)
                        .map(std::time::Duration::from_secs)
                        .unwrap_or(self.inner.config.min_interval);
                    warn!(
                        error = %e,
                        retries_left = retries_left,
                        "Failed to edit message, retrying after {:?}", delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
