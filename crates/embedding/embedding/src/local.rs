//! Local fallback embedder used when `USE_EXTERNAL_EMBEDDINGS` is unset or
//! its endpoint isn't configured (spec §6). Deterministic and dependency-free
//! so the pipeline always has *some* vector to search/store with, even with
//! no network access: a fixed-width hashed bag-of-words, L2-normalized.

use async_trait::async_trait;

use crate::EmbeddingService;

/// Dimensionality of vectors produced by [`LocalHashEmbedder`]. Arbitrary but
/// fixed, so it matches whatever collection schema a deployment seeds it
/// with; independent of any external model's native dimension.
pub const LOCAL_EMBEDDING_DIM: usize = 256;

/// Hashes each lowercased word into a bucket of a fixed-width vector, then
/// L2-normalizes. Two semantically related sentences sharing vocabulary will
/// score higher under cosine similarity than unrelated ones; it is not a
/// substitute for a trained embedding model, only a working default.
#[derive(Debug, Clone, Default)]
pub struct LocalHashEmbedder;

impl LocalHashEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; LOCAL_EMBEDDING_DIM];
        for word in text.to_lowercase().split_whitespace() {
            let bucket = fnv1a(word) as usize % LOCAL_EMBEDDING_DIM;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

fn fnv1a(s: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for byte in s.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[async_trait]
impl EmbeddingService for LocalHashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embed_produces_a_unit_vector_of_the_fixed_dimension() {
        let embedder = LocalHashEmbedder::new();
        let vector = embedder.embed("the ocean is full of wonder").await.unwrap();
        assert_eq!(vector.len(), LOCAL_EMBEDDING_DIM);
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4 || norm == 0.0);
    }

    #[tokio::test]
    async fn shared_vocabulary_scores_higher_than_disjoint_vocabulary() {
        let embedder = LocalHashEmbedder::new();
        let a = embedder.embed("coral reefs and marine biology").await.unwrap();
        let b = embedder.embed("coral reefs and ocean biology").await.unwrap();
        let c = embedder.embed("quarterly tax filing deadlines").await.unwrap();

        let dot = |x: &[f32], y: &[f32]| x.iter().zip(y).map(|(p, q)| p * q).sum::<f32>();
        assert!(dot(&a, &b) > dot(&a, &c));
    }

    #[tokio::test]
    async fn empty_text_yields_the_zero_vector_without_dividing_by_zero() {
        let embedder = LocalHashEmbedder::new();
        let vector = embedder.embed("").await.unwrap();
        assert!(vector.iter().all(|v| *v == 0.0));
    }
}
