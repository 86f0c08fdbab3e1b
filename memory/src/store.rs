//! The [`VectorMemoryStore`] contract (L3).

use std::collections::HashMap;

use async_trait::async_trait;
use memory_core::{Contradiction, MemoryRecord, VectorName, VectorStrategy};

use crate::error::Result;

/// Per-named-vector embeddings of the *query* being searched for. A strategy
/// that names a vector not present here is simply skipped for that search.
#[derive(Debug, Clone, Default)]
pub struct QueryVectors(HashMap<VectorName, Vec<f32>>);

impl QueryVectors {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, name: VectorName, embedding: Vec<f32>) -> Self {
        self.0.insert(name, embedding);
        self
    }

    pub fn get(&self, name: VectorName) -> Option<&[f32]> {
        self.0.get(&name).map(|v| v.as_slice())
    }
}

/// Storage-agnostic contract for one character's vector memory collection.
///
/// Implementations own collection lifecycle (lazy creation per spec §4.3) and
/// MUST enforce cross-user and cross-character isolation: `search`,
/// `scroll_recent`, and `history` never return a record belonging to another
/// `user_id`, and no two characters ever share a collection.
#[async_trait]
pub trait VectorMemoryStore: Send + Sync {
    /// Embeds (already done by the caller — records carry pre-computed
    /// embeddings) and upserts a record, lazily creating the character's
    /// collection if it does not yet exist.
    async fn store(&self, character: &str, record: MemoryRecord) -> Result<()>;

    /// Executes `strategy` against `character`'s collection, scoped to
    /// `user_id`. A single-vector strategy performs one search; a fused
    /// strategy performs one search per named vector and combines results
    /// via reciprocal-rank fusion, deduplicated by record id, truncated to
    /// `limit`. `strategy.fuse == false && strategy.vector_names.is_empty()`
    /// (the temporal/scroll case) is not valid input for `search` — callers
    /// route that case to [`VectorMemoryStore::scroll_recent`] instead.
    async fn search(
        &self,
        character: &str,
        user_id: &str,
        query_vectors: &QueryVectors,
        strategy: &VectorStrategy,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>>;

    /// Time-ordered descending scroll, no vector scoring; used for temporal queries.
    async fn scroll_recent(&self, character: &str, user_id: &str, limit: usize) -> Result<Vec<MemoryRecord>>;

    /// Latest `limit` records ordered by timestamp descending.
    async fn history(&self, character: &str, user_id: &str, limit: usize) -> Result<Vec<MemoryRecord>>;

    /// Optional capability: prior records whose content embedding diverges
    /// (cosine similarity below `threshold`) from `new_content_embedding`
    /// while sharing `user_id` scope. Implementations that do not support
    /// this return `Ok(vec![])`; callers fall back to the deterministic
    /// keyword heuristic in the `intelligence` crate's context-switch
    /// detector, per spec §4.3/§4.6.
    async fn detect_contradictions(
        &self,
        character: &str,
        user_id: &str,
        new_content_embedding: &[f32],
        threshold: f32,
    ) -> Result<Vec<Contradiction>>;
}
