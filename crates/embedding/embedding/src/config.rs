//! Embedding service configuration, loaded from the environment variables
//! spec §6 recognizes: `USE_EXTERNAL_EMBEDDINGS`, `LLM_EMBEDDING_API_URL`,
//! `LLM_EMBEDDING_MODEL_NAME`, `LLM_API_KEY`.

use std::env;

/// Resolved embedding configuration: either an external OpenAI-compatible
/// endpoint, or nothing (callers fall back to [`crate::LocalHashEmbedder`]).
#[derive(Debug, Clone, Default)]
pub struct EmbeddingConfig {
    pub use_external: bool,
    pub api_url: Option<String>,
    pub model_name: Option<String>,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_env() -> Self {
        let use_external = env::var("USE_EXTERNAL_EMBEDDINGS")
            .ok()
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        let api_url = env::var("LLM_EMBEDDING_API_URL").ok().filter(|s| !s.trim().is_empty());
        let model_name = env::var("LLM_EMBEDDING_MODEL_NAME").ok().filter(|s| !s.trim().is_empty());
        let api_key = env::var("LLM_API_KEY").ok().filter(|s| !s.trim().is_empty());
        Self { use_external, api_url, model_name, api_key }
    }

    /// `true` only when external embeddings were requested AND an endpoint
    /// is actually configured; otherwise the caller should use the local
    /// fallback embedder regardless of the flag.
    pub fn should_use_external(&self) -> bool {
        self.use_external && self.api_url.is_some() && self.model_name.is_some()
    }
}

/// Alias retained for the name used elsewhere in the workspace's startup wiring.
pub type EnvEmbeddingConfig = EmbeddingConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn external_requires_both_url_and_model_name() {
        std::env::set_var("USE_EXTERNAL_EMBEDDINGS", "true");
        std::env::remove_var("LLM_EMBEDDING_API_URL");
        std::env::remove_var("LLM_EMBEDDING_MODEL_NAME");
        let config = EmbeddingConfig::from_env();
        assert!(!config.should_use_external());

        std::env::set_var("LLM_EMBEDDING_API_URL", "https://example.invalid/v1");
        std::env::set_var("LLM_EMBEDDING_MODEL_NAME", "text-embedding-3-small");
        let config = EmbeddingConfig::from_env();
        assert!(config.should_use_external());

        std::env::remove_var("USE_EXTERNAL_EMBEDDINGS");
        std::env::remove_var("LLM_EMBEDDING_API_URL");
        std::env::remove_var("LLM_EMBEDDING_MODEL_NAME");
    }
}
