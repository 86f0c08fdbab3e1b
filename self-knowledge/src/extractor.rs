//! Extractor: builds a `CharacterKnowledgeProfile` from the static trait
//! tables in the Knowledge Store.

use crate::profile::{BigFive, CharacterKnowledgeProfile, CommunicationStyle};
use storage::{CharacterTrait, KnowledgeStore, StorageError};

pub struct Extractor<'a> {
    store: &'a KnowledgeStore,
}

impl<'a> Extractor<'a> {
    pub fn new(store: &'a KnowledgeStore) -> Self {
        Self { store }
    }

    pub async fn extract(&self, character: &str) -> Result<CharacterKnowledgeProfile, StorageError> {
        let traits = self.store.get_character_traits(character).await?;

        let mut big_five = BigFive::default();
        let mut values = Vec::new();
        let mut abilities = Vec::new();
        let mut interests = Vec::new();
        let mut behavioral_triggers = Vec::new();
        let mut communication_rows: Vec<&CharacterTrait> = Vec::new();

        for t in &traits {
            match t.trait_type.as_str() {
                "personality" => assign_big_five(&mut big_five, t),
                "value" => values.push(t.clone()),
                "ability" => abilities.push(t.clone()),
                "interest" => interests.push(t.clone()),
                "behavior" => behavioral_triggers.push(t.clone()),
                "communication" => communication_rows.push(t),
                _ => {}
            }
        }

        let communication = derive_communication_style(&communication_rows);
        let confidence = crate::profile::compute_confidence(&traits);

        Ok(CharacterKnowledgeProfile {
            character: character.to_string(),
            big_five,
            values,
            abilities,
            interests,
            communication,
            behavioral_triggers,
            confidence,
        })
    }
}

fn assign_big_five(big_five: &mut BigFive, t: &CharacterTrait) {
    match t.trait_name.as_str() {
        "openness" => big_five.openness = t.intensity,
        "conscientiousness" => big_five.conscientiousness = t.intensity,
        "extraversion" => big_five.extraversion = t.intensity,
        "agreeableness" => big_five.agreeableness = t.intensity,
        "neuroticism" => big_five.neuroticism = t.intensity,
        _ => {}
    }
}

fn derive_communication_style(rows: &[&CharacterTrait]) -> CommunicationStyle {
    let mut style = CommunicationStyle::default();
    for t in rows {
        match t.trait_name.as_str() {
            "engagement_level" => style.engagement_level = t.intensity,
            "formality" => style.formality = t.intensity,
            "emotional_expression" => style.emotional_expression = t.intensity,
            "response_length" => style.response_length = t.intensity,
            _ => {}
        }
    }
    style
}
