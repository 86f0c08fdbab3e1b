//! `CharacterKnowledgeProfile`: the extractor's output.

use std::collections::HashMap;
use storage::CharacterTrait;

#[derive(Debug, Clone, Default)]
pub struct BigFive {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CommunicationStyle {
    pub engagement_level: f64,
    pub formality: f64,
    pub emotional_expression: f64,
    pub response_length: f64,
}

#[derive(Debug, Clone)]
pub struct CharacterKnowledgeProfile {
    pub character: String,
    pub big_five: BigFive,
    pub values: Vec<CharacterTrait>,
    pub abilities: Vec<CharacterTrait>,
    pub interests: Vec<CharacterTrait>,
    pub communication: CommunicationStyle,
    pub behavioral_triggers: Vec<CharacterTrait>,
    pub confidence: f64,
}

const PERSONALITY_SATURATION: usize = 20;
const KIND_VARIETY_SATURATION: usize = 5;

/// Trait count, kind variety, and high-importance count each contribute a
/// third of the final confidence, saturating independently.
pub fn compute_confidence(traits: &[CharacterTrait]) -> f64 {
    if traits.is_empty() {
        return 0.0;
    }
    let count_score = (traits.len() as f64 / PERSONALITY_SATURATION as f64).min(1.0);

    let mut kinds: HashMap<&str, ()> = HashMap::new();
    for t in traits {
        kinds.insert(t.trait_type.as_str(), ());
    }
    let variety_score = (kinds.len() as f64 / KIND_VARIETY_SATURATION as f64).min(1.0);

    let high_importance = traits.iter().filter(|t| t.importance >= 8).count();
    let importance_score = (high_importance as f64 / 5.0).min(1.0);

    ((count_score + variety_score + importance_score) / 3.0).clamp(0.0, 1.0)
}
