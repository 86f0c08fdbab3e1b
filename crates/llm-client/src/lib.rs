//! # LLM client
//!
//! Non-streaming chat completion client consumed by the pipeline controller
//! (L11) to turn an assembled `LlmRequest` (L10) into a reply, plus the HTTP
//! external-emotion client the orchestrator (L9) fans out to. Streaming is
//! explicitly out of scope.

mod config;
mod external_emotion;

pub use config::{ChatEndpointConfig, OptionalEndpointConfig};
pub use external_emotion::HttpExternalEmotionClient;

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, OpenAIClient,
};
use prompt::{ChatMessage, MessageRole};

/// The LLM failure kinds the pipeline controller must turn into a fixed,
/// persona-styled apology rather than ever letting an error escape to the
/// user (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmFailureKind {
    Connection,
    Timeout,
    RateLimit,
    Generic,
}

/// A fixed, persona-appropriate apology for each failure kind. These are
/// deliberately vague about the cause — the character is speaking, not a
/// status page.
pub fn persona_apology(kind: LlmFailureKind) -> &'static str {
    match kind {
        LlmFailureKind::Connection => "...the pathways have grown dim, and I can't quite reach you right now.",
        LlmFailureKind::Timeout => "...time moves strangely for me just now. Give me a moment and try again?",
        LlmFailureKind::RateLimit => "...there are too many seekers reaching for me at once. Try again shortly.",
        LlmFailureKind::Generic => "...something has gone quiet on my end. Let's try that again.",
    }
}

/// Chat completion client interface (spec §6).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `messages` (already budgeted and leakage-scanned by L10) and
    /// returns the model's reply text.
    async fn chat_completion(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Startup validation: the endpoint must answer `/models` with at least
    /// one entry (spec §6).
    async fn validate_startup(&self) -> Result<()>;
}

fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default().content(content).build()?.into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default().content(content).build()?.into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default().content(content).build()?.into(),
    };
    Ok(openai_msg)
}

/// [`LlmClient`] implementation against any OpenAI-compatible chat
/// completion endpoint, configured per [`ChatEndpointConfig`].
#[derive(Clone)]
pub struct OpenAiCompatibleLlmClient {
    client: OpenAIClient,
    model: String,
}

impl OpenAiCompatibleLlmClient {
    pub fn new(config: ChatEndpointConfig) -> Self {
        let client = OpenAIClient::with_base_url(config.api_key.clone().unwrap_or_default(), config.base_url.clone());
        Self { client, model: config.model }
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleLlmClient {
    async fn chat_completion(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut openai_messages = Vec::with_capacity(messages.len());
        for msg in messages {
            openai_messages.push(chat_message_to_openai(msg)?);
        }
        self.client.chat_completion(&self.model, openai_messages, None, None).await
    }

    async fn validate_startup(&self) -> Result<()> {
        let count = self.client.validate_models_endpoint().await?;
        tracing::info!(model_count = count, model = %self.model, "LLM chat endpoint validated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_failure_kind_has_a_distinct_persona_apology() {
        let kinds = [
            LlmFailureKind::Connection,
            LlmFailureKind::Timeout,
            LlmFailureKind::RateLimit,
            LlmFailureKind::Generic,
        ];
        let messages: Vec<&str> = kinds.iter().map(|k| persona_apology(*k)).collect();
        let mut unique = messages.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), messages.len());
    }
}
