//! LLM endpoint configuration loaded from environment variables (spec §6).
//!
//! The chat endpoint is required; emotion and fact-extraction endpoints are
//! optional and independently keyed, matching those features being
//! optional/non-fatal elsewhere in the pipeline.

use anyhow::Context as _;
use std::env;

/// The main chat completion endpoint (`LLM_CHAT_API_URL`, `CHAT_MODEL_NAME`, `LLM_API_KEY`).
#[derive(Debug, Clone)]
pub struct ChatEndpointConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl ChatEndpointConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("LLM_CHAT_API_URL").context("LLM_CHAT_API_URL not set")?;
        let model = env::var("CHAT_MODEL_NAME").context("CHAT_MODEL_NAME not set")?;
        let api_key = env::var("LLM_API_KEY").ok().filter(|s| !s.trim().is_empty());
        Ok(Self { base_url, model, api_key })
    }
}

/// An optional auxiliary endpoint (emotion or fact extraction): absent
/// entirely when unconfigured, never an error.
#[derive(Debug, Clone)]
pub struct OptionalEndpointConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl OptionalEndpointConfig {
    fn from_vars(url_var: &str, key_var: &str) -> Option<Self> {
        let base_url = env::var(url_var).ok().filter(|s| !s.trim().is_empty())?;
        let api_key = env::var(key_var).ok().filter(|s| !s.trim().is_empty());
        Some(Self { base_url, api_key })
    }

    pub fn emotion_from_env() -> Option<Self> {
        Self::from_vars("LLM_EMOTION_API_URL", "LLM_EMOTION_API_KEY")
    }

    pub fn facts_from_env() -> Option<Self> {
        Self::from_vars("LLM_FACTS_API_URL", "LLM_FACTS_API_KEY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn chat_endpoint_requires_url_and_model() {
        std::env::remove_var("LLM_CHAT_API_URL");
        std::env::remove_var("CHAT_MODEL_NAME");
        assert!(ChatEndpointConfig::from_env().is_err());

        std::env::set_var("LLM_CHAT_API_URL", "https://example.invalid/v1");
        std::env::set_var("CHAT_MODEL_NAME", "test-model");
        let config = ChatEndpointConfig::from_env().unwrap();
        assert_eq!(config.model, "test-model");
        assert!(config.api_key.is_none());

        std::env::remove_var("LLM_CHAT_API_URL");
        std::env::remove_var("CHAT_MODEL_NAME");
    }

    #[test]
    #[serial]
    fn optional_endpoint_is_absent_without_an_error_when_unset() {
        std::env::remove_var("LLM_EMOTION_API_URL");
        assert!(OptionalEndpointConfig::emotion_from_env().is_none());
    }
}
