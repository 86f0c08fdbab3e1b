//! Query Classifier (L2).
//!
//! Assigns one of five categories to a raw query and maps that category to a
//! [`VectorStrategy`] consumed by the vector memory store (L3). Priority order
//! (first match wins) is factual, conversational, emotional, temporal,
//! general — conversational is checked before temporal so that a query like
//! "what did we talk about yesterday?" stays conversational even though it
//! also carries a temporal marker.

use memory_core::{QueryCategory, VectorName, VectorStrategy};

/// Case-insensitive substring/prefix patterns that mark a query as factual.
const FACTUAL_PATTERNS: &[&str] = &[
    "what is",
    "define",
    "how to",
    "explain",
    "calculate",
    "formula",
    "definition of",
    "tell me about",
];

/// Patterns that mark a query as referring back to the shared conversation.
const CONVERSATIONAL_PATTERNS: &[&str] = &[
    "we talked",
    "our conversation",
    "remember when",
    "you mentioned",
    "what did we",
    "did we talk",
    "we discussed",
];

/// Keywords that mark a query as emotionally charged.
const EMOTIONAL_KEYWORDS: &[&str] = &[
    "feel",
    "feeling",
    "mood",
    "how are you",
    "happy",
    "sad",
    "angry",
    "excited",
    "anxious",
    "scared",
];

/// Threshold at which an externally supplied emotional-intensity signal, on
/// its own, is enough to classify a query as emotional.
const EMOTIONAL_INTENSITY_THRESHOLD: f32 = 0.3;

/// Stateless classifier: priority-ordered pattern matching over the raw query
/// text plus two pre-analyzed signals (emotional intensity, temporal flag).
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryClassifier;

impl QueryClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classifies `query` into a category and returns the vector strategy to
    /// use for retrieval. `emotional_intensity` and `is_temporal` are
    /// expected to come from an upstream emotion/temporal analysis pass; this
    /// function performs no analysis of its own beyond keyword matching.
    pub fn classify(
        &self,
        query: &str,
        emotional_intensity: f32,
        is_temporal: bool,
    ) -> (QueryCategory, VectorStrategy) {
        let lower = query.to_lowercase();

        let category = if contains_any(&lower, FACTUAL_PATTERNS) {
            QueryCategory::Factual
        } else if contains_any(&lower, CONVERSATIONAL_PATTERNS) {
            QueryCategory::Conversational
        } else if contains_any(&lower, EMOTIONAL_KEYWORDS)
            || emotional_intensity >= EMOTIONAL_INTENSITY_THRESHOLD
        {
            QueryCategory::Emotional
        } else if is_temporal {
            QueryCategory::Temporal
        } else {
            QueryCategory::General
        };

        tracing::debug!(category = ?category, query_len = query.len(), "classified query");
        (category, strategy_for(category))
    }
}

fn contains_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| haystack.contains(p))
}

/// Maps a category to its fixed vector-retrieval strategy, per spec §4.2.
fn strategy_for(category: QueryCategory) -> VectorStrategy {
    match category {
        QueryCategory::Factual => VectorStrategy::single(VectorName::Content),
        QueryCategory::Conversational => {
            VectorStrategy::fused(&[(VectorName::Content, 0.5), (VectorName::Semantic, 0.5)])
        }
        QueryCategory::Emotional => {
            VectorStrategy::fused(&[(VectorName::Content, 0.4), (VectorName::Emotion, 0.6)])
        }
        QueryCategory::Temporal => VectorStrategy::scroll(),
        QueryCategory::General => VectorStrategy::single(VectorName::Content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factual_query_uses_content_only() {
        let (cat, strat) = QueryClassifier::new().classify("What is photosynthesis?", 0.0, false);
        assert_eq!(cat, QueryCategory::Factual);
        assert!(!strat.fuse);
        assert_eq!(strat.vector_names, vec![VectorName::Content]);
    }

    #[test]
    fn conversational_beats_temporal() {
        // Literal spec scenario: conversational priority wins over a temporal marker.
        let (cat, strat) =
            QueryClassifier::new().classify("What did we talk about yesterday?", 0.0, true);
        assert_eq!(cat, QueryCategory::Conversational);
        assert!(strat.fuse);
        assert_eq!(strat.weights, vec![0.5, 0.5]);
    }

    #[test]
    fn emotional_keyword_triggers_emotional_category() {
        let (cat, _) =
            QueryClassifier::new().classify("I'm feeling really anxious today", 0.0, false);
        assert_eq!(cat, QueryCategory::Emotional);
    }

    #[test]
    fn emotional_intensity_alone_triggers_emotional_category() {
        let (cat, _) = QueryClassifier::new().classify("nothing special here", 0.5, false);
        assert_eq!(cat, QueryCategory::Emotional);
    }

    #[test]
    fn pure_temporal_without_conversational_marker() {
        let (cat, strat) = QueryClassifier::new().classify("what happened first?", 0.0, true);
        assert_eq!(cat, QueryCategory::Temporal);
        assert_eq!(strat.vector_names.len(), 0);
    }

    #[test]
    fn fallback_is_general() {
        let (cat, strat) = QueryClassifier::new().classify("lovely weather today", 0.0, false);
        assert_eq!(cat, QueryCategory::General);
        assert_eq!(strat.vector_names, vec![VectorName::Content]);
    }
}
