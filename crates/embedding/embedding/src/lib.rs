//! # Text Embeddings
//!
//! Defines the embedding service interface (spec §6) consumed by the memory
//! store (L3) to vectorize turns, facts, and queries. [`EmbeddingConfig`]
//! resolves which backend to use; [`LocalHashEmbedder`] is the dependency-free
//! fallback used whenever external embeddings aren't configured. The
//! `openai-embedding` crate provides the external-endpoint implementation.

use async_trait::async_trait;

mod config;
mod local;

pub use config::{EmbeddingConfig, EnvEmbeddingConfig};
pub use local::{LocalHashEmbedder, LOCAL_EMBEDDING_DIM};

/// Service for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for multiple texts in a single API call.
    /// This is more efficient than calling `embed` multiple times.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error>;
}
