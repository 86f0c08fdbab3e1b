//! In-process [`VectorMemoryStore`] implementation.
//!
//! Collections are plain `Vec<MemoryRecord>` keyed by the deterministic
//! per-character collection name. Suitable for tests and small/single-box
//! deployments; a Qdrant-shaped backend would implement the same trait with
//! server-side filtering and indexed ANN search instead of the linear scan
//! used here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use memory::{MemoryError, QueryVectors, Result, VectorMemoryStore};
use memory_core::{collection_name_for_character, Contradiction, MemoryRecord, VectorName, VectorStrategy};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct InMemoryVectorStore {
    collections: Arc<RwLock<HashMap<String, Vec<MemoryRecord>>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn collection_len(&self, character: &str) -> usize {
        let name = collection_name_for_character(character);
        self.collections
            .read()
            .await
            .get(&name)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Ranks `records` (already filtered to `user_id`) by similarity to
/// `query_embedding` along `vector_name`, best-first. Records without that
/// named embedding are excluded.
fn rank_by_vector<'a>(
    records: &'a [MemoryRecord],
    vector_name: VectorName,
    query_embedding: &[f32],
) -> Vec<(Uuid, f32, &'a MemoryRecord)> {
    let mut scored: Vec<(Uuid, f32, &MemoryRecord)> = records
        .iter()
        .filter_map(|r| {
            r.embeddings
                .get(&vector_name)
                .map(|emb| (r.id, cosine_similarity(query_embedding, emb), r))
        })
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.2.timestamp.cmp(&a.2.timestamp))
    });
    scored
}

#[async_trait]
impl VectorMemoryStore for InMemoryVectorStore {
    async fn store(&self, character: &str, record: MemoryRecord) -> Result<()> {
        let name = collection_name_for_character(character);
        let mut collections = self.collections.write().await;
        let collection = collections.entry(name.clone()).or_default();
        collection.push(record);
        tracing::debug!(collection = %name, size = collection.len(), "stored memory record");
        Ok(())
    }

    async fn search(
        &self,
        character: &str,
        user_id: &str,
        query_vectors: &QueryVectors,
        strategy: &VectorStrategy,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>> {
        let name = collection_name_for_character(character);
        let collections = self.collections.read().await;
        let Some(all) = collections.get(&name) else {
            return Ok(Vec::new());
        };
        let scoped: Vec<MemoryRecord> = all.iter().filter(|r| r.user_id == user_id).cloned().collect();
        drop(collections);

        if strategy.vector_names.is_empty() {
            // Not a valid `search` strategy (see scroll_recent); degrade gracefully.
            return self.scroll_recent(character, user_id, limit).await;
        }

        if !strategy.fuse && strategy.vector_names.len() == 1 {
            let vector_name = strategy.vector_names[0];
            let Some(query_embedding) = query_vectors.get(vector_name) else {
                return Ok(Vec::new());
            };
            let ranked = rank_by_vector(&scoped, vector_name, query_embedding);
            return Ok(ranked.into_iter().take(limit).map(|(_, _, r)| r.clone()).collect());
        }

        let mut ranked_lists: Vec<(f32, Vec<Uuid>)> = Vec::new();
        let mut by_id: HashMap<Uuid, MemoryRecord> = HashMap::new();
        for (vector_name, weight) in strategy.vector_names.iter().zip(strategy.weights.iter()) {
            let Some(query_embedding) = query_vectors.get(*vector_name) else {
                continue;
            };
            let ranked = rank_by_vector(&scoped, *vector_name, query_embedding);
            let ids = ranked
                .into_iter()
                .take(limit)
                .map(|(id, _, r)| {
                    by_id.insert(id, r.clone());
                    id
                })
                .collect();
            ranked_lists.push((*weight, ids));
        }

        let scores = memory::reciprocal_rank_fusion(&ranked_lists);
        let mut fused: Vec<(Uuid, f32)> = scores.into_iter().collect();
        fused.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let ta = by_id.get(&a.0).map(|r| r.timestamp);
                    let tb = by_id.get(&b.0).map(|r| r.timestamp);
                    tb.cmp(&ta)
                })
        });

        Ok(fused
            .into_iter()
            .take(limit)
            .filter_map(|(id, _)| by_id.get(&id).cloned())
            .collect())
    }

    async fn scroll_recent(&self, character: &str, user_id: &str, limit: usize) -> Result<Vec<MemoryRecord>> {
        self.history(character, user_id, limit).await
    }

    async fn history(&self, character: &str, user_id: &str, limit: usize) -> Result<Vec<MemoryRecord>> {
        let name = collection_name_for_character(character);
        let collections = self.collections.read().await;
        let Some(all) = collections.get(&name) else {
            return Ok(Vec::new());
        };
        let mut scoped: Vec<MemoryRecord> = all.iter().filter(|r| r.user_id == user_id).cloned().collect();
        scoped.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        scoped.truncate(limit);
        Ok(scoped)
    }

    async fn detect_contradictions(
        &self,
        character: &str,
        user_id: &str,
        new_content_embedding: &[f32],
        threshold: f32,
    ) -> Result<Vec<Contradiction>> {
        if new_content_embedding.is_empty() {
            return Err(MemoryError::Unavailable("empty query embedding".into()));
        }
        let name = collection_name_for_character(character);
        let collections = self.collections.read().await;
        let Some(all) = collections.get(&name) else {
            return Ok(Vec::new());
        };
        let out = all
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| r.embeddings.get(&VectorName::Content).map(|e| (r.id, e)))
            .map(|(id, emb)| (id, cosine_similarity(new_content_embedding, emb)))
            .filter(|(_, sim)| *sim < threshold)
            .map(|(record_id, similarity)| Contradiction { record_id, similarity })
            .collect();
        Ok(out)
    }
}
