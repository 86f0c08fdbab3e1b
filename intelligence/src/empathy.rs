//! Empathy Calibrator (L7).
//!
//! Recommends a response style for the current turn from a baseline
//! effectiveness table, adjusted by whatever the user's own feedback history
//! has taught us works for them for that specific emotion. State is one
//! `EmpathyPreference` per `(user, emotion kind)`, guarded the same way
//! `boundary::BoundaryManager` guards per-session state: a per-key lock
//! inside an outer `RwLock<HashMap<...>>`, with coarse eviction once the
//! table grows past a cap.

use crate::mode::ConversationMode;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub const DEFAULT_MAX_TRACKED_PREFERENCES: usize = 10_000;
/// `PHASE3_EMPATHY_LEARNING_RATE` default (spec §6).
const EMPATHY_LEARNING_RATE: f32 = 0.1;
/// `PHASE3_EMPATHY_MIN_INTERACTIONS` default (spec §6).
const MIN_INTERACTIONS_FOR_CONFIDENCE: u32 = 3;
/// `PHASE3_EMPATHY_CONFIDENCE_THRESHOLD` default (spec §6): above this, a
/// user's learned preference wins over the baseline table.
const PREFERENCE_CONFIDENCE_THRESHOLD: f32 = 0.5;
const HIGH_INTENSITY_THRESHOLD: f32 = 0.7;
const VOLATILITY_VARIANCE_THRESHOLD: f32 = 2.0;

/// The spec's fixed set of six empathy styles (§4.7, `empathy_calibrator.py:25-30`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmpathyStyle {
    DirectAcknowledgment,
    ReflectiveListening,
    SolutionFocused,
    ValidationFirst,
    GentleInquiry,
    SupportivePresence,
}

const ALL_STYLES: &[EmpathyStyle] = &[
    EmpathyStyle::DirectAcknowledgment,
    EmpathyStyle::ReflectiveListening,
    EmpathyStyle::SolutionFocused,
    EmpathyStyle::ValidationFirst,
    EmpathyStyle::GentleInquiry,
    EmpathyStyle::SupportivePresence,
];

/// The "emotion kind" an empathy preference is keyed by, alongside the user
/// id. Deliberately coarse (keyword classification only); the orchestrator's
/// richer emotion analysis (external/intrinsic fan-out) is a separate signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmotionCategory {
    Frustration,
    Sadness,
    Anxiety,
    Joy,
    Neutral,
}

const FRUSTRATION_WORDS: &[&str] = &["frustrated", "annoyed", "angry", "furious", "fed up"];
const SADNESS_WORDS: &[&str] = &["sad", "down", "depressed", "hurt", "upset"];
const ANXIETY_WORDS: &[&str] = &["anxious", "worried", "nervous", "scared", "overwhelmed"];
const JOY_WORDS: &[&str] = &["happy", "excited", "great", "wonderful", "thrilled"];

pub fn classify_emotion(message: &str) -> EmotionCategory {
    let lower = message.to_lowercase();
    if FRUSTRATION_WORDS.iter().any(|w| lower.contains(w)) {
        EmotionCategory::Frustration
    } else if SADNESS_WORDS.iter().any(|w| lower.contains(w)) {
        EmotionCategory::Sadness
    } else if ANXIETY_WORDS.iter().any(|w| lower.contains(w)) {
        EmotionCategory::Anxiety
    } else if JOY_WORDS.iter().any(|w| lower.contains(w)) {
        EmotionCategory::Joy
    } else {
        EmotionCategory::Neutral
    }
}

/// Baseline effectiveness of each style for a given emotion, in [0, 1].
/// Winners match the spec's literal table: frustration -> validation_first
/// 0.8, sadness/anxiety -> supportive_presence 0.8, excitement (joy) ->
/// direct_acknowledgment 0.8.
fn baseline_score(emotion: EmotionCategory, style: EmpathyStyle) -> f32 {
    use EmotionCategory::*;
    use EmpathyStyle::*;
    match (emotion, style) {
        (Frustration, ValidationFirst) => 0.8,
        (Frustration, SolutionFocused) => 0.65,
        (Frustration, DirectAcknowledgment) => 0.55,
        (Frustration, ReflectiveListening) => 0.5,
        (Frustration, GentleInquiry) => 0.45,
        (Frustration, SupportivePresence) => 0.4,

        (Sadness, SupportivePresence) => 0.8,
        (Sadness, ReflectiveListening) => 0.7,
        (Sadness, ValidationFirst) => 0.65,
        (Sadness, GentleInquiry) => 0.55,
        (Sadness, SolutionFocused) => 0.35,
        (Sadness, DirectAcknowledgment) => 0.3,

        (Anxiety, SupportivePresence) => 0.8,
        (Anxiety, ReflectiveListening) => 0.7,
        (Anxiety, GentleInquiry) => 0.65,
        (Anxiety, ValidationFirst) => 0.6,
        (Anxiety, SolutionFocused) => 0.5,
        (Anxiety, DirectAcknowledgment) => 0.4,

        (Joy, DirectAcknowledgment) => 0.8,
        (Joy, ValidationFirst) => 0.6,
        (Joy, SupportivePresence) => 0.45,
        (Joy, ReflectiveListening) => 0.5,
        (Joy, GentleInquiry) => 0.4,
        (Joy, SolutionFocused) => 0.35,

        (Neutral, DirectAcknowledgment) => 0.55,
        (Neutral, GentleInquiry) => 0.5,
        (Neutral, ReflectiveListening) => 0.45,
        (Neutral, ValidationFirst) => 0.45,
        (Neutral, SolutionFocused) => 0.45,
        (Neutral, SupportivePresence) => 0.4,
    }
}

/// Indicators inferred from the surface signal of the user's next message
/// (or a provisional self-estimate at turn close), feeding the fixed
/// positive/negative effectiveness table in `learn` (spec §4.7).
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackIndicators {
    pub conversation_continued: bool,
    pub de_escalation: bool,
    pub gratitude_expressed: bool,
    pub more_detail_shared: bool,
    pub positive_sentiment: bool,
    pub abrupt_end: bool,
    pub repeated_frustration: bool,
    pub requested_different_response: bool,
    pub escalation: bool,
}

fn compute_effectiveness(feedback: &FeedbackIndicators) -> f32 {
    let mut score = 0.5_f32;
    if feedback.conversation_continued {
        score += 0.2;
    }
    if feedback.de_escalation {
        score += 0.3;
    }
    if feedback.gratitude_expressed {
        score += 0.2;
    }
    if feedback.more_detail_shared {
        score += 0.1;
    }
    if feedback.positive_sentiment {
        score += 0.3;
    }
    if feedback.abrupt_end {
        score -= 0.4;
    }
    if feedback.repeated_frustration {
        score -= 0.3;
    }
    if feedback.requested_different_response {
        score -= 0.2;
    }
    if feedback.escalation {
        score -= 0.4;
    }
    score.clamp(0.0, 1.0)
}

/// Learned record for one `(user, emotion kind)` pair.
#[derive(Debug, Clone)]
pub struct EmpathyPreference {
    pub preferred_style: EmpathyStyle,
    pub confidence: f32,
    pub style_effectiveness: HashMap<EmpathyStyle, f32>,
    pub interaction_count: u32,
    pub last_positive_response: Option<DateTime<Utc>>,
    pub history: Vec<(EmpathyStyle, f32)>,
}

#[derive(Debug, Clone)]
pub struct EmpathyCalibration {
    pub primary_style: EmpathyStyle,
    pub confidence: f32,
    pub reasoning: String,
    pub alternatives: Vec<EmpathyStyle>,
    pub overridden_by_problem_solving: bool,
}

type PreferenceKey = (String, EmotionCategory);

pub struct EmpathyCalibrator {
    preferences: RwLock<HashMap<PreferenceKey, Arc<Mutex<Option<EmpathyPreference>>>>>,
    max_tracked_preferences: usize,
}

impl EmpathyCalibrator {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_TRACKED_PREFERENCES)
    }

    pub fn with_capacity(max_tracked_preferences: usize) -> Self {
        Self {
            preferences: RwLock::new(HashMap::new()),
            max_tracked_preferences,
        }
    }

    async fn preference_lock(&self, key: &PreferenceKey) -> Arc<Mutex<Option<EmpathyPreference>>> {
        if let Some(existing) = self.preferences.read().await.get(key) {
            return existing.clone();
        }
        let mut table = self.preferences.write().await;
        if table.len() >= self.max_tracked_preferences && !table.contains_key(key) {
            if let Some(evict) = table.keys().next().cloned() {
                table.remove(&evict);
            }
        }
        table.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(None))).clone()
    }

    /// Recommends a style for the current turn (spec §4.7):
    /// 1. Use the learned preference if its confidence clears the threshold,
    ///    else the baseline effectiveness table.
    /// 2. Inspect up to the last 10 messages for emotional volatility and
    ///    the current message for intensity.
    /// 3. Adjust: high intensity escalates `gentle_inquiry` to
    ///    `direct_acknowledgment`; volatility forces `validation_first`; a
    ///    `problem_solving` conversation mode overrides to `solution_focused`.
    /// 4. Return up to three alternatives, the user's own historical
    ///    preference inserted first when it differs from the primary style.
    pub async fn calibrate(
        &self,
        user_id: &str,
        message: &str,
        mode: ConversationMode,
        recent_messages: &[String],
    ) -> EmpathyCalibration {
        let emotion = classify_emotion(message);
        let key = (user_id.to_string(), emotion);
        let lock = self.preference_lock(&key).await;
        let existing = lock.lock().await.clone();

        let mut scored: Vec<(EmpathyStyle, f32)> =
            ALL_STYLES.iter().map(|&style| (style, baseline_score(emotion, style))).collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        let mut reasoning = Vec::new();
        let (mut primary_style, mut confidence) = match &existing {
            Some(pref) if pref.confidence > PREFERENCE_CONFIDENCE_THRESHOLD => {
                reasoning.push(format!(
                    "using this user's learned preference for {emotion:?} (confidence {:.2})",
                    pref.confidence
                ));
                (pref.preferred_style, pref.confidence)
            }
            _ => {
                reasoning.push(format!("using baseline effectiveness table for {emotion:?}"));
                scored[0]
            }
        };

        let intensity = message_intensity(message);
        if intensity >= HIGH_INTENSITY_THRESHOLD && primary_style == EmpathyStyle::GentleInquiry {
            primary_style = EmpathyStyle::DirectAcknowledgment;
            reasoning.push(format!("high message intensity ({intensity:.2}) escalated gentle inquiry to direct acknowledgment"));
        }

        if is_volatile(recent_messages) {
            primary_style = EmpathyStyle::ValidationFirst;
            reasoning.push("recent emotional volatility forced validation-first".to_string());
        }

        let mut overridden = false;
        if mode == ConversationMode::ProblemSolving && primary_style != EmpathyStyle::SolutionFocused {
            primary_style = EmpathyStyle::SolutionFocused;
            confidence = scored
                .iter()
                .find(|(s, _)| *s == EmpathyStyle::SolutionFocused)
                .map(|(_, c)| *c)
                .unwrap_or(0.5);
            overridden = true;
            reasoning.push("problem-solving conversation mode overrides the primary style to solution-focused".to_string());
        }

        let mut alternatives: Vec<EmpathyStyle> = Vec::new();
        if let Some(pref) = &existing {
            if pref.preferred_style != primary_style {
                alternatives.push(pref.preferred_style);
            }
        }
        for (style, _) in &scored {
            if alternatives.len() >= 3 {
                break;
            }
            if *style != primary_style && !alternatives.contains(style) {
                alternatives.push(*style);
            }
        }
        alternatives.truncate(3);

        EmpathyCalibration {
            primary_style,
            confidence,
            reasoning: reasoning.join("; "),
            alternatives,
            overridden_by_problem_solving: overridden,
        }
    }

    /// Learns from the outcome of a style that was actually used (spec
    /// §4.7). `feedback` is inferred from the surface signals of the user's
    /// next reply, or a provisional self-estimate at turn close.
    pub async fn learn(&self, user_id: &str, emotion: EmotionCategory, used_style: EmpathyStyle, feedback: &FeedbackIndicators) {
        let effectiveness = compute_effectiveness(feedback);
        let key = (user_id.to_string(), emotion);
        let lock = self.preference_lock(&key).await;
        let mut slot = lock.lock().await;

        match slot.as_mut() {
            Some(pref) => {
                let previous_effectiveness = pref.style_effectiveness.get(&used_style).copied().unwrap_or(effectiveness);
                let smoothed = previous_effectiveness + EMPATHY_LEARNING_RATE * (effectiveness - previous_effectiveness);
                pref.style_effectiveness.insert(used_style, smoothed);
                pref.history.push((used_style, smoothed));
                if pref.history.len() > 10 {
                    pref.history.remove(0);
                }
                pref.interaction_count += 1;
                if effectiveness >= 0.5 {
                    pref.last_positive_response = Some(Utc::now());
                }

                if pref.interaction_count >= MIN_INTERACTIONS_FOR_CONFIDENCE {
                    let preferred_effectiveness = pref.style_effectiveness.get(&pref.preferred_style).copied().unwrap_or(0.0);
                    if used_style != pref.preferred_style && smoothed > preferred_effectiveness {
                        pref.preferred_style = used_style;
                        pref.confidence = (pref.confidence + 0.1).min(1.0);
                    }
                }
            }
            None => {
                let mut style_effectiveness = HashMap::new();
                style_effectiveness.insert(used_style, effectiveness);
                *slot = Some(EmpathyPreference {
                    preferred_style: used_style,
                    confidence: 0.3,
                    style_effectiveness,
                    interaction_count: 1,
                    last_positive_response: if effectiveness >= 0.5 { Some(Utc::now()) } else { None },
                    history: vec![(used_style, effectiveness)],
                });
            }
        }
    }
}

impl Default for EmpathyCalibrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Rough intensity heuristic in [0, 1]: intensifying words, exclamation/
/// question punctuation, message length, and word repetition (spec §4.7).
fn message_intensity(message: &str) -> f32 {
    const INTENSIFIERS: &[&str] = &["extremely", "absolutely", "completely", "totally", "so", "very", "really"];
    let lower = message.to_lowercase();
    let mut score = 0.0_f32;

    score += INTENSIFIERS.iter().filter(|w| lower.contains(*w)).count() as f32 * 0.1;
    score += lower.matches('!').count() as f32 * 0.15;
    score += lower.matches('?').count() as f32 * 0.05;

    let words: Vec<&str> = lower.split_whitespace().collect();
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for w in &words {
        *counts.entry(*w).or_insert(0) += 1;
    }
    if counts.values().any(|&c| c >= 3) {
        score += 0.2;
    }
    if words.len() > 40 {
        score += 0.15;
    }

    score.clamp(0.0, 1.0)
}

/// Ordinal scale for volatility variance only (distinct from L6's own
/// topic/emotion distance mapping): wide enough that a conversation swinging
/// between joy and frustration can clear the 2.0 variance threshold.
fn emotion_ordinal(emotion: EmotionCategory) -> f32 {
    match emotion {
        EmotionCategory::Joy => 2.0,
        EmotionCategory::Neutral => 0.0,
        EmotionCategory::Anxiety => -1.0,
        EmotionCategory::Sadness => -2.0,
        EmotionCategory::Frustration => -3.0,
    }
}

/// True when the variance of the last up-to-10 messages' ordinal emotion
/// labels exceeds the fixed threshold (spec §4.7).
fn is_volatile(recent_messages: &[String]) -> bool {
    if recent_messages.len() < 3 {
        return false;
    }
    let window = &recent_messages[recent_messages.len().saturating_sub(10)..];
    let values: Vec<f32> = window.iter().map(|m| emotion_ordinal(classify_emotion(m))).collect();
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
    variance > VOLATILITY_VARIANCE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frustration_plus_problem_solving_mode_overrides_to_solution_focused() {
        let calibrator = EmpathyCalibrator::new();
        let calibration = calibrator
            .calibrate(
                "user-1",
                "I'm so frustrated this is broken and doesn't work",
                ConversationMode::ProblemSolving,
                &[],
            )
            .await;
        assert_eq!(calibration.primary_style, EmpathyStyle::SolutionFocused);
        assert!(calibration.overridden_by_problem_solving);
        assert!(calibration.confidence >= 0.5 && calibration.confidence <= 0.8);
        assert!(calibration.alternatives.len() >= 2);
    }

    #[tokio::test]
    async fn sadness_without_problem_solving_mode_prefers_supportive_presence() {
        let calibrator = EmpathyCalibrator::new();
        let calibration = calibrator
            .calibrate("user-2", "I've been feeling really down and hurt lately", ConversationMode::Casual, &[])
            .await;
        assert_eq!(calibration.primary_style, EmpathyStyle::SupportivePresence);
        assert!(!calibration.overridden_by_problem_solving);
    }

    #[tokio::test]
    async fn repeated_overrides_accumulate_confidence_until_the_preference_is_trusted() {
        let calibrator = EmpathyCalibrator::new();
        let low = FeedbackIndicators { repeated_frustration: true, ..Default::default() };
        let mid = FeedbackIndicators { requested_different_response: true, more_detail_shared: true, ..Default::default() };
        let high = FeedbackIndicators { more_detail_shared: true, ..Default::default() };
        let highest = FeedbackIndicators { positive_sentiment: true, ..Default::default() };

        calibrator.learn("user-3", EmotionCategory::Neutral, EmpathyStyle::SupportivePresence, &low).await;
        calibrator.learn("user-3", EmotionCategory::Neutral, EmpathyStyle::SupportivePresence, &low).await;
        // Third interaction: reached min_interactions_for_confidence; a better-scoring
        // style overwrites the preferred style and bumps confidence 0.3 -> 0.4.
        calibrator.learn("user-3", EmotionCategory::Neutral, EmpathyStyle::ReflectiveListening, &mid).await;
        // Fourth: direct_acknowledgment scores higher still, confidence 0.4 -> 0.5.
        calibrator.learn("user-3", EmotionCategory::Neutral, EmpathyStyle::DirectAcknowledgment, &high).await;
        // Fifth: gentle_inquiry scores highest, confidence 0.5 -> 0.6, now trusted.
        calibrator.learn("user-3", EmotionCategory::Neutral, EmpathyStyle::GentleInquiry, &highest).await;

        let calibration = calibrator.calibrate("user-3", "just a normal day today", ConversationMode::Casual, &[]).await;
        assert_eq!(calibration.primary_style, EmpathyStyle::GentleInquiry);
        assert!(calibration.confidence > 0.5);
        assert!(calibration.reasoning.contains("learned preference"));
    }

    #[tokio::test]
    async fn a_single_interaction_does_not_yet_meet_min_interactions_for_confidence() {
        let calibrator = EmpathyCalibrator::new();
        let positive = FeedbackIndicators { positive_sentiment: true, gratitude_expressed: true, ..Default::default() };
        calibrator.learn("user-4", EmotionCategory::Neutral, EmpathyStyle::GentleInquiry, &positive).await;
        // Fresh preference starts at confidence 0.3, below the 0.5 threshold
        // `calibrate` requires before trusting it over the baseline table.
        let calibration = calibrator.calibrate("user-4", "just a normal day today", ConversationMode::Casual, &[]).await;
        assert!(calibration.reasoning.contains("baseline"));
    }

    #[tokio::test]
    async fn volatile_recent_history_forces_validation_first() {
        let calibrator = EmpathyCalibrator::new();
        let history = vec![
            "I'm so happy and thrilled today".to_string(),
            "I am furious and fed up".to_string(),
            "this is wonderful and great".to_string(),
            "I'm so frustrated and angry".to_string(),
        ];
        let calibration = calibrator.calibrate("user-5", "just checking in".to_string().as_str(), ConversationMode::Casual, &history).await;
        assert_eq!(calibration.primary_style, EmpathyStyle::ValidationFirst);
    }
}
