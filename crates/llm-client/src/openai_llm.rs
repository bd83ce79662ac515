//! OpenAI-backed [`LlmClient`]: wraps openai-client and prepends the system message.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, CompletionParams,
    StreamChunk as OpenAIStreamChunk,
};
use tracing::instrument;

use super::{chat_message_to_openai, ChatMessage, LlmClient, StreamChunk, StreamChunkCallback};

/// System instructions used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Do short answers unless user asks for details. \
In detailed messages use bold to highlight the main idea. \
Answer using the language user used in their last message unless they ask for a specific language.";

#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    system_prompt: Option<String>,
}

impl OpenAILlmClient {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: openai_client::OpenAIClient::with_base_url(api_key, base_url),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt_opt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    fn system_content(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    fn request_messages(&self, messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut openai_messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_content().to_string())
                .build()?
                .into()];
        for msg in messages {
            openai_messages.push(chat_message_to_openai(msg)?);
        }
        Ok(openai_messages)
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages, params), fields(model = %params.model))]
    async fn get_llm_response_with_messages(
        &self,
        messages: Vec<ChatMessage>,
        params: &CompletionParams,
    ) -> Result<String> {
        let openai_messages = self.request_messages(&messages)?;
        self.client.chat_completion(params, openai_messages).await
    }

    #[instrument(skip(self, messages, params, callback), fields(model = %params.model))]
    async fn get_llm_response_stream_with_messages(
        &self,
        messages: Vec<ChatMessage>,
        params: &CompletionParams,
        callback: &mut StreamChunkCallback,
    ) -> Result<String> {
        let openai_messages = self.request_messages(&messages)?;
        self.client
            .chat_completion_stream(params, openai_messages, |chunk: OpenAIStreamChunk| {
                callback(StreamChunk {
                    content: chunk.content,
                    done: chunk.done,
                })
            })
            .await
    }
}
