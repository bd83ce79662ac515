//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for chat completion (non-stream and stream).
//! Provides token masking for safe logging and per-request sampling parameters.

use async_openai::{
    types::{CreateChatCompletionRequest, CreateChatCompletionRequestArgs},
    Client,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// Model and sampling settings for one completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl CompletionParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            top_p: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// OpenAI chat client. Wraps async-openai client and holds the API key for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<async_openai::config::OpenAIConfig>>,
    /// API key stored only for logging (masked).
    api_key_for_logging: String,
}

/// One streamed content delta and whether the stream is finished.
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
}

impl OpenAIClient {
    /// Builds a client for `base_url` (the OpenAI API or a compatible endpoint).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let api_key_for_logging = api_key.clone();
        let config = async_openai::config::OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            api_key_for_logging,
        }
    }

    fn masked_key(&self) -> String {
        mask_token(&self.api_key_for_logging)
    }

    fn build_request(
        params: &CompletionParams,
        messages: Vec<ChatCompletionRequestMessage>,
        stream: bool,
    ) -> anyhow::Result<CreateChatCompletionRequest> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(params.model.as_str())
            .messages(messages)
            .n(1)
            .stream(stream);
        if let Some(temperature) = params.temperature {
            args.temperature(temperature);
        }
        if let Some(top_p) = params.top_p {
            args.top_p(top_p);
        }
        Ok(args.build()?)
    }

    /// Sends a chat completion request and returns the first choice's content.
    ///
    /// A choice with no content yields an empty string; no choices at all is an error.
    pub async fn chat_completion(
        &self,
        params: &CompletionParams,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> anyhow::Result<String> {
        tracing::info!(
            model = %params.model,
            message_count = messages.len(),
            api_key = %self.masked_key(),
            "OpenAI chat_completion request"
        );

        let request = Self::build_request(params, messages, false)?;
        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion request JSON");
        }

        let response = self.client.chat().create(request).await?;

        if let Some(ref u) = response.usage {
            tracing::info!(
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI chat_completion usage"
            );
        }

        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.clone().unwrap_or_default()),
            None => anyhow::bail!("No response from OpenAI"),
        }
    }

    /// Streams a chat completion, invoking `callback` once per non-empty content delta.
    /// Returns the full concatenated response text. Stream and callback errors are propagated.
    pub async fn chat_completion_stream<F, Fut>(
        &self,
        params: &CompletionParams,
        messages: Vec<ChatCompletionRequestMessage>,
        mut callback: F,
    ) -> anyhow::Result<String>
    where
        F: FnMut(StreamChunk) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<()>>,
    {
        tracing::info!(
            model = %params.model,
            message_count = messages.len(),
            api_key = %self.masked_key(),
            "OpenAI chat_completion_stream request"
        );

        let request = Self::build_request(params, messages, true)?;
        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI chat_completion_stream request JSON");
        }

        let mut stream = self.client.chat().create_stream(request).await?;
        let mut full_response = String::new();

        while let Some(result) = stream.next().await {
            let chunk = match result {
                Ok(chunk) => chunk,
                Err(e) => anyhow::bail!("Stream error: {}", e),
            };
            if let Some(ref u) = chunk.usage {
                tracing::info!(
                    prompt_tokens = u.prompt_tokens,
                    completion_tokens = u.completion_tokens,
                    total_tokens = u.total_tokens,
                    "OpenAI chat_completion_stream usage"
                );
            }
            if let Some(choice) = chunk.choices.first() {
                let done = choice.finish_reason.is_some();
                match &choice.delta.content {
                    Some(content) if !content.is_empty() => {
                        full_response.push_str(content);
                        callback(StreamChunk {
                            content: content.clone(),
                            done,
                        })
                        .await?;
                    }
                    _ => {}
                }
            }
        }

        tracing::debug!(
            response_len = full_response.len(),
            "OpenAI chat_completion_stream finished"
        );
        Ok(full_response)
    }
}
