//! Derived edges of a character's self-knowledge graph (L8 Graph Builder output).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraitRelationKind {
    Influences,
    LeadsTo,
    Contradicts,
    Supports,
    ExpressesAs,
    Motivates,
}

impl TraitRelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraitRelationKind::Influences => "influences",
            TraitRelationKind::LeadsTo => "leads_to",
            TraitRelationKind::Contradicts => "contradicts",
            TraitRelationKind::Supports => "supports",
            TraitRelationKind::ExpressesAs => "expresses_as",
            TraitRelationKind::Motivates => "motivates",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "influences" => TraitRelationKind::Influences,
            "leads_to" => TraitRelationKind::LeadsTo,
            "contradicts" => TraitRelationKind::Contradicts,
            "supports" => TraitRelationKind::Supports,
            "expresses_as" => TraitRelationKind::ExpressesAs,
            "motivates" => TraitRelationKind::Motivates,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterTraitRelationship {
    pub character: String,
    pub source: String,
    pub target: String,
    pub relationship_type: TraitRelationKind,
    pub strength: f64,
    pub context: Option<String>,
}
