//! Graph Builder: derives `CharacterTraitRelationship` edges from a
//! `CharacterKnowledgeProfile` via a fixed set of keyword-triggered rules.

use crate::profile::CharacterKnowledgeProfile;
use storage::{CharacterTraitRelationship, TraitRelationKind};

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, profile: &CharacterKnowledgeProfile) -> Vec<CharacterTraitRelationship> {
        let character = profile.character.clone();
        let mut edges = Vec::new();

        let honest_value = profile.values.iter().find(|v| contains_any(&v.trait_value, &["honest", "truth"]));
        let empathy_value = profile.values.iter().find(|v| contains_any(&v.trait_value, &["empathy", "caring"]));
        let knowledge_value = profile.values.iter().find(|v| contains_any(&v.trait_value, &["knowledge", "learning"]));
        let science_interest = profile.interests.iter().find(|v| contains_any(&v.trait_value, &["science"]));

        let mut directness_fired = false;
        let mut empathy_fired = false;

        if let Some(v) = honest_value {
            edges.push(edge(&character, &v.key(), "communication:direct_style", TraitRelationKind::LeadsTo, 0.8));
            directness_fired = true;
        }
        if let Some(v) = empathy_value {
            edges.push(edge(&character, &v.key(), "communication:supportive_tone", TraitRelationKind::ExpressesAs, 0.9));
            empathy_fired = true;
        }
        if let Some(v) = knowledge_value {
            edges.push(edge(&character, &v.key(), "behavior:educational_sharing", TraitRelationKind::Motivates, 0.7));
        }
        if let Some(v) = science_interest {
            edges.push(edge(&character, &v.key(), "behavior:scientific_explanations", TraitRelationKind::Motivates, 0.7));
        }

        if empathy_fired && directness_fired {
            edges.push(edge(
                &character,
                "value.empathy+value.honesty",
                "behavior:compassionate_honesty",
                TraitRelationKind::Supports,
                0.75,
            ));
        }

        edges
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn edge(character: &str, source: &str, target: &str, kind: TraitRelationKind, strength: f64) -> CharacterTraitRelationship {
    CharacterTraitRelationship {
        character: character.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        relationship_type: kind,
        strength,
        context: None,
    }
}
