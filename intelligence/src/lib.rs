//! Context Switch Detector (L6) and Empathy Calibrator (L7).
//!
//! Both operate purely on signals handed to them by the caller (the
//! orchestrator crate) rather than querying memory or boundary state
//! directly, keeping this crate a leaf with respect to the rest of the
//! workspace.

mod context_switch;
mod empathy;
mod mode;
mod types;

pub use context_switch::{urgency_score, ContextSwitchDetector};
pub use empathy::{
    classify_emotion, EmotionCategory, EmpathyCalibration, EmpathyCalibrator, EmpathyPreference,
    EmpathyStyle, FeedbackIndicators, DEFAULT_MAX_TRACKED_PREFERENCES,
};
pub use mode::{classify_intent, classify_mode, mode_distance, ConversationMode, Intent};
pub use types::{
    AdaptationStrategy, ContextSnapshot, ContextSwitch, SwitchKind, SwitchStrength, TurnSignals,
};
