//! Bundle types produced by the orchestrator and consumed by the prompt
//! assembler (L10).

use chrono::{DateTime, Utc};
use intelligence::{ContextSwitch, EmpathyCalibration};
use self_knowledge::{BehavioralPattern, CharacterKnowledgeProfile, TraitMotivation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionSource {
    External,
    Intrinsic,
}

#[derive(Debug, Clone)]
pub struct ExternalEmotionResult {
    pub primary_emotion: String,
    pub confidence: f32,
    pub intensity: f32,
    pub tier_used: Option<String>,
    pub analysis_time_ms: Option<u64>,
    pub api_calls_made: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct IntrinsicEmotionResult {
    pub primary_emotion: String,
    pub confidence: f32,
    pub intensity: f32,
}

/// Result of reconciling external and intrinsic emotion analysis when both
/// are present and disagree: external wins when confident enough, otherwise
/// intrinsic is trusted.
#[derive(Debug, Clone)]
pub struct CombinedEmotion {
    pub primary_emotion: String,
    pub confidence: f32,
    pub intensity: f32,
    pub source: EmotionSource,
    pub external: Option<ExternalEmotionResult>,
    pub intrinsic: Option<IntrinsicEmotionResult>,
}

#[derive(Debug, Clone, Default)]
pub struct SelfKnowledgeSummary {
    pub profile: Option<CharacterKnowledgeProfile>,
    pub top_motivations: Vec<TraitMotivation>,
    pub behavioral_patterns: Vec<BehavioralPattern>,
}

/// Fan-in result of the four concurrent intelligence tasks. Any field may be
/// `None`/empty: a failed or timed-out task must not fail the turn, only
/// narrow what L10 can draw on. `context_switches` holds up to one
/// [`ContextSwitch`] per axis (spec §4.6) and is empty rather than absent
/// when the detector ran but found nothing worth flagging.
#[derive(Debug, Clone, Default)]
pub struct IntelligenceBundle {
    pub emotion: Option<CombinedEmotion>,
    pub context_switches: Vec<ContextSwitch>,
    pub empathy: Option<EmpathyCalibration>,
    pub self_knowledge: Option<SelfKnowledgeSummary>,
    pub computed_at: Option<DateTime<Utc>>,
}
