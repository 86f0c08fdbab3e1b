//! Shared snapshot and result types for L6/L7.

use crate::empathy::{EmotionCategory, EmpathyStyle};
use crate::mode::{ConversationMode, Intent};
use chrono::{DateTime, Utc};

/// The five axes a context switch can be detected along (spec §4.6): at most
/// one switch is emitted per kind per turn, so a single turn can carry up to
/// five switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchKind {
    TopicShift,
    EmotionalShift,
    ConversationMode,
    UrgencyChange,
    IntentChange,
}

/// Four-level strength scale (spec §4.6); topic shifts use the literal
/// 0.3/0.5/0.7 dissimilarity thresholds to pick moderate/strong/dramatic,
/// other kinds scale their own confidence onto the same four buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchStrength {
    Subtle,
    Moderate,
    Strong,
    Dramatic,
}

impl SwitchStrength {
    /// General-purpose confidence-to-strength mapping for kinds that don't
    /// have their own literal threshold table (emotional, urgency, intent).
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= 0.85 {
            SwitchStrength::Dramatic
        } else if confidence >= 0.65 {
            SwitchStrength::Strong
        } else if confidence >= 0.4 {
            SwitchStrength::Moderate
        } else {
            SwitchStrength::Subtle
        }
    }

    /// Topic-shift-specific mapping using the spec's literal dissimilarity
    /// thresholds: >= 0.7 dramatic, >= 0.5 strong, >= 0.3 moderate, else subtle.
    pub fn from_topic_dissimilarity(dissimilarity: f32) -> Self {
        if dissimilarity >= 0.7 {
            SwitchStrength::Dramatic
        } else if dissimilarity >= 0.5 {
            SwitchStrength::Strong
        } else if dissimilarity >= 0.3 {
            SwitchStrength::Moderate
        } else {
            SwitchStrength::Subtle
        }
    }
}

/// Recommended adaptation strategy, mapped by switch *kind* (spec §4.6):
/// topic_shift -> acknowledge_transition, emotional_shift ->
/// emotional_validation, conversation_mode -> mode_adjustment,
/// urgency_change -> urgency_adaptation, intent_change -> intent_realignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptationStrategy {
    AcknowledgeTransition,
    EmotionalValidation,
    ModeAdjustment,
    UrgencyAdaptation,
    IntentRealignment,
}

impl SwitchKind {
    pub fn adaptation_strategy(self) -> AdaptationStrategy {
        match self {
            SwitchKind::TopicShift => AdaptationStrategy::AcknowledgeTransition,
            SwitchKind::EmotionalShift => AdaptationStrategy::EmotionalValidation,
            SwitchKind::ConversationMode => AdaptationStrategy::ModeAdjustment,
            SwitchKind::UrgencyChange => AdaptationStrategy::UrgencyAdaptation,
            SwitchKind::IntentChange => AdaptationStrategy::IntentRealignment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContextSwitch {
    pub kind: SwitchKind,
    pub strength: SwitchStrength,
    pub confidence: f32,
    pub strategy: AdaptationStrategy,
    pub description: String,
    pub from_keywords: Vec<String>,
    pub to_keywords: Vec<String>,
}

/// Everything the detector and calibrator need about the turn preceding the
/// current one; supplied by the orchestrator, which is the only crate that
/// talks to the memory and boundary layers directly.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub previous_message: String,
    pub previous_mode: ConversationMode,
    pub previous_intent: Intent,
    pub previous_emotion_intensity: f32,
    pub previous_timestamp: DateTime<Utc>,
    /// The emotion kind and style `EmpathyCalibrator` recommended last turn,
    /// carried so the controller can feed this turn's surface signals back
    /// into `learn` as feedback on that choice (spec §4.7/§4.11).
    pub previous_emotion: EmotionCategory,
    pub previous_empathy_style: Option<EmpathyStyle>,
}

#[derive(Debug, Clone)]
pub struct TurnSignals {
    pub message: String,
    pub mode: ConversationMode,
    pub intent: Intent,
    pub emotion_intensity: f32,
    pub urgency: f32,
    pub timestamp: DateTime<Utc>,
}
