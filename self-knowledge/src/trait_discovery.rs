//! Trait Discovery: derives motivations, behavioral patterns, and bounded
//! self-awareness insights from a profile and its derived graph.
//!
//! Discovery is deterministic given its inputs, so the whole per-character
//! result is cached for an hour rather than keyed per insight kind
//! separately — cheaper to compute the triple once than to track staleness
//! for each piece independently.

use crate::profile::CharacterKnowledgeProfile;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use storage::{CharacterTraitRelationship, TraitRelationKind};

const CACHE_TTL: Duration = Duration::from_secs(3600);
const PATTERN_STRENGTH_THRESHOLD: f64 = 0.7;
const PATTERN_MIN_RELATIONSHIPS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Motivation,
    Behavior,
    Preferences,
    Values,
}

#[derive(Debug, Clone)]
pub struct TraitMotivation {
    pub label: String,
    pub confidence: f64,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct BehavioralPattern {
    pub relationship_type: TraitRelationKind,
    pub members: Vec<(String, String)>,
    pub strength: f64,
}

#[derive(Debug, Clone)]
pub struct SelfAwarenessInsight {
    pub kind: InsightKind,
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutput {
    pub motivations: Vec<TraitMotivation>,
    pub patterns: Vec<BehavioralPattern>,
    pub insights: Vec<SelfAwarenessInsight>,
}

const MOTIVATION_VOCAB: &[(&str, &str)] = &[
    ("help", "helping others"),
    ("learn", "continuous learning"),
    ("teach", "sharing knowledge"),
    ("connect", "building connection"),
    ("protect", "protecting others"),
    ("explore", "exploration and curiosity"),
    ("create", "creative expression"),
    ("understand", "seeking understanding"),
];

pub struct TraitDiscovery {
    cache: Mutex<HashMap<String, (Instant, DiscoveryOutput)>>,
}

impl TraitDiscovery {
    pub fn new() -> Self {
        Self { cache: Mutex::new(HashMap::new()) }
    }

    pub fn discover(&self, profile: &CharacterKnowledgeProfile, graph: &[CharacterTraitRelationship]) -> DiscoveryOutput {
        if let Some((stamped_at, cached)) = self.cache.lock().unwrap().get(&profile.character) {
            if stamped_at.elapsed() < CACHE_TTL {
                return cached.clone();
            }
        }

        let motivations = discover_motivations(profile);
        let patterns = discover_patterns(graph);
        let insights = build_insights(profile, &motivations, &patterns);
        let output = DiscoveryOutput { motivations, patterns, insights };

        self.cache
            .lock()
            .unwrap()
            .insert(profile.character.clone(), (Instant::now(), output.clone()));
        output
    }
}

impl Default for TraitDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_motivations(profile: &CharacterKnowledgeProfile) -> Vec<TraitMotivation> {
    let mut out = Vec::new();
    for source in profile.values.iter().chain(profile.interests.iter()) {
        let lower = source.trait_value.to_lowercase();
        for (keyword, label) in MOTIVATION_VOCAB {
            if lower.contains(keyword) {
                let confidence = (source.intensity * 0.6 + (source.importance as f64 / 10.0) * 0.4).clamp(0.0, 1.0);
                out.push(TraitMotivation {
                    label: label.to_string(),
                    confidence,
                    source: source.key(),
                });
            }
        }
    }
    out.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    out
}

fn discover_patterns(graph: &[CharacterTraitRelationship]) -> Vec<BehavioralPattern> {
    let mut buckets: HashMap<String, Vec<&CharacterTraitRelationship>> = HashMap::new();
    for rel in graph {
        if rel.strength >= PATTERN_STRENGTH_THRESHOLD {
            buckets.entry(rel.relationship_type.as_str().to_string()).or_default().push(rel);
        }
    }

    let mut patterns = Vec::new();
    for (kind_str, rels) in buckets {
        if rels.len() < PATTERN_MIN_RELATIONSHIPS {
            continue;
        }
        let Some(kind) = TraitRelationKind::parse(&kind_str) else { continue };
        let avg_strength = rels.iter().map(|r| r.strength).sum::<f64>() / rels.len() as f64;
        patterns.push(BehavioralPattern {
            relationship_type: kind,
            members: rels.iter().map(|r| (r.source.clone(), r.target.clone())).collect(),
            strength: avg_strength,
        });
    }
    patterns.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap());
    patterns
}

fn build_insights(
    profile: &CharacterKnowledgeProfile,
    motivations: &[TraitMotivation],
    patterns: &[BehavioralPattern],
) -> Vec<SelfAwarenessInsight> {
    let mut insights = Vec::new();

    if !motivations.is_empty() {
        let top: Vec<&str> = motivations.iter().take(3).map(|m| m.label.as_str()).collect();
        insights.push(SelfAwarenessInsight {
            kind: InsightKind::Motivation,
            text: format!("driven primarily by {}", top.join(", ")),
            confidence: motivations[0].confidence,
        });
    }

    if !patterns.is_empty() {
        let behaviors: Vec<String> = patterns
            .iter()
            .take(5)
            .map(|p| format!("{} ({})", p.relationship_type.as_str(), p.members.len()))
            .collect();
        insights.push(SelfAwarenessInsight {
            kind: InsightKind::Behavior,
            text: format!("recurring behavioral patterns: {}", behaviors.join(", ")),
            confidence: patterns[0].strength,
        });
    }

    if !profile.values.is_empty() {
        let names: Vec<&str> = profile.values.iter().take(3).map(|v| v.trait_name.as_str()).collect();
        insights.push(SelfAwarenessInsight {
            kind: InsightKind::Values,
            text: format!("core values include {}", names.join(", ")),
            confidence: profile.confidence,
        });
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{BigFive, CommunicationStyle};
    use storage::CharacterTrait;

    fn profile_with_value(text: &str) -> CharacterKnowledgeProfile {
        CharacterKnowledgeProfile {
            character: "elena".into(),
            big_five: BigFive::default(),
            values: vec![CharacterTrait {
                character: "elena".into(),
                trait_type: "value".into(),
                trait_name: "curiosity".into(),
                trait_value: text.into(),
                intensity: 0.9,
                importance: 9,
                context: None,
            }],
            abilities: vec![],
            interests: vec![],
            communication: CommunicationStyle::default(),
            behavioral_triggers: vec![],
            confidence: 0.6,
        }
    }

    #[test]
    fn motivation_keyword_scan_matches_vocabulary() {
        let profile = profile_with_value("loves to explore and learn about the ocean");
        let discovery = TraitDiscovery::new();
        let out = discovery.discover(&profile, &[]);
        assert!(out.motivations.iter().any(|m| m.label == "exploration and curiosity"));
        assert!(out.motivations.iter().any(|m| m.label == "continuous learning"));
    }

    #[test]
    fn behavioral_pattern_requires_minimum_relationships_above_threshold() {
        let profile = profile_with_value("learn");
        let discovery = TraitDiscovery::new();
        let graph = vec![CharacterTraitRelationship {
            character: "elena".into(),
            source: "value.curiosity".into(),
            target: "behavior:educational_sharing".into(),
            relationship_type: TraitRelationKind::Motivates,
            strength: 0.8,
            context: None,
        }];
        let out = discovery.discover(&profile, &graph);
        assert!(out.patterns.is_empty());
    }

    #[test]
    fn repeated_discover_call_returns_cached_output() {
        let profile = profile_with_value("learn");
        let discovery = TraitDiscovery::new();
        let first = discovery.discover(&profile, &[]);
        let second = discovery.discover(&profile, &[]);
        assert_eq!(first.motivations.len(), second.motivations.len());
    }
}
