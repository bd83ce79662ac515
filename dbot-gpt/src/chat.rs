//! Chat turn: sends the user's dialog to the completion backend and shows the reply in one
//! message that grows while the completion streams.

use async_trait::async_trait;
use dbot_core::{Bot, Handler, HandlerResponse, Message, Result};
use dbot_stream::{run_stream_edit_loop, EditConfig, MessageHandle};
use llm_client::{ChatMessage, CompletionParams, LlmClient, StreamChunk, StreamChunkCallback};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use crate::session::SessionStore;

/// Shown after the partial reply while the completion is running.
pub const INDICATOR: &str = "⏳";
pub const MSG_INVALID_INPUT: &str = "Invalid input";
pub const MSG_COMPLETION_ERROR: &str = "Completion error";
pub const MSG_LLM_FAILED: &str = "Sorry, LLM response failed.";

pub struct ChatHandler {
    bot: Arc<dyn Bot>,
    llm_client: Arc<dyn LlmClient>,
    sessions: Arc<SessionStore>,
    edit_config: EditConfig,
}

impl ChatHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        llm_client: Arc<dyn LlmClient>,
        sessions: Arc<SessionStore>,
        edit_config: EditConfig,
    ) -> Self {
        Self {
            bot,
            llm_client,
            sessions,
            edit_config,
        }
    }

    /// Logs error and its cause chain. First item with `first_msg`, rest with "Caused by".
    fn log_error_chain(e: &anyhow::Error, first_msg: &str) {
        for (i, cause) in e.chain().enumerate() {
            if i == 0 {
                error!(cause = %cause, "{}", first_msg);
            } else {
                error!(cause = %cause, "Caused by");
            }
        }
    }

    /// Streams the completion into `handle` as non-guaranteed updates; returns the full text.
    async fn complete_streaming(
        &self,
        handle: &MessageHandle,
        messages: Vec<ChatMessage>,
        params: &CompletionParams,
    ) -> anyhow::Result<String> {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let edit_loop = tokio::spawn(run_stream_edit_loop(
            handle.clone(),
            rx,
            INDICATOR.to_string(),
        ));

        let mut stream_callback: Box<StreamChunkCallback> = Box::new(
            move |chunk: StreamChunk| -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> {
                // The loop only stops once every sender is gone.
                let _ = tx.send(chunk.content);
                Box::pin(async { Ok(()) })
            },
        );
        let result = self
            .llm_client
            .get_llm_response_stream_with_messages(messages, params, stream_callback.as_mut())
            .await;
        drop(stream_callback);

        if let Err(e) = edit_loop.await {
            error!(error = %e, "Stream edit loop failed");
        }
        result
    }

    async fn complete(
        &self,
        handle: &MessageHandle,
        messages: Vec<ChatMessage>,
        params: &CompletionParams,
        streaming: bool,
    ) -> anyhow::Result<String> {
        let text = if streaming {
            self.complete_streaming(handle, messages, params).await?
        } else {
            self.llm_client
                .get_llm_response_with_messages(messages, params)
                .await?
        };
        if text.trim().is_empty() {
            Ok(MSG_COMPLETION_ERROR.to_string())
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl Handler for ChatHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id, user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.is_text() {
            self.bot.reply_to(message, MSG_INVALID_INPUT).await?;
            return Ok(HandlerResponse::Stop);
        }

        let chat_id = message.chat.id;
        let (messages, params, streaming) = self.sessions.with_session(chat_id, |s| {
            s.add_dialog_message(ChatMessage::user(message.content.clone()));
            (s.dialog(), s.completion_params(), s.streaming)
        });
        info!(
            model = %params.model,
            streaming = streaming,
            message_count = messages.len(),
            "step: chat completion"
        );

        let handle = MessageHandle::create(
            self.bot.clone(),
            message.chat.clone(),
            INDICATOR,
            self.edit_config.clone(),
        );

        match self.complete(&handle, messages, &params, streaming).await {
            Ok(reply) => {
                handle.update(reply.clone(), true).await?;
                self.sessions.with_session(chat_id, |s| {
                    s.add_dialog_message(ChatMessage::assistant(reply.clone()))
                });
                info!(reply_len = reply.len(), "step: chat reply delivered");
                Ok(HandlerResponse::Reply(reply))
            }
            Err(e) => {
                Self::log_error_chain(&e, "LLM response failed");
                handle.update(MSG_LLM_FAILED, true).await?;
                Ok(HandlerResponse::Stop)
            }
        }
    }
}
