//! Reconciles external and intrinsic emotion results into one
//! [`CombinedEmotion`], per the recorded tie-break decision: prefer external
//! when it disagrees with intrinsic and its confidence is >= 0.7, otherwise
//! trust intrinsic.

use crate::types::{CombinedEmotion, EmotionSource, ExternalEmotionResult, IntrinsicEmotionResult};

const EXTERNAL_CONFIDENCE_TIE_BREAK: f32 = 0.7;

pub fn combine_emotion(
    external: Option<ExternalEmotionResult>,
    intrinsic: Option<IntrinsicEmotionResult>,
) -> Option<CombinedEmotion> {
    match (external, intrinsic) {
        (None, None) => None,
        (Some(ext), None) => Some(CombinedEmotion {
            primary_emotion: ext.primary_emotion.clone(),
            confidence: ext.confidence,
            intensity: ext.intensity,
            source: EmotionSource::External,
            external: Some(ext),
            intrinsic: None,
        }),
        (None, Some(intr)) => Some(CombinedEmotion {
            primary_emotion: intr.primary_emotion.clone(),
            confidence: intr.confidence,
            intensity: intr.intensity,
            source: EmotionSource::Intrinsic,
            external: None,
            intrinsic: Some(intr),
        }),
        (Some(ext), Some(intr)) => {
            if ext.primary_emotion == intr.primary_emotion {
                return Some(CombinedEmotion {
                    primary_emotion: ext.primary_emotion.clone(),
                    confidence: ext.confidence.max(intr.confidence),
                    intensity: (ext.intensity + intr.intensity) / 2.0,
                    source: EmotionSource::External,
                    external: Some(ext),
                    intrinsic: Some(intr),
                });
            }
            if ext.confidence >= EXTERNAL_CONFIDENCE_TIE_BREAK {
                Some(CombinedEmotion {
                    primary_emotion: ext.primary_emotion.clone(),
                    confidence: ext.confidence,
                    intensity: ext.intensity,
                    source: EmotionSource::External,
                    external: Some(ext),
                    intrinsic: Some(intr),
                })
            } else {
                Some(CombinedEmotion {
                    primary_emotion: intr.primary_emotion.clone(),
                    confidence: intr.confidence,
                    intensity: intr.intensity,
                    source: EmotionSource::Intrinsic,
                    external: Some(ext),
                    intrinsic: Some(intr),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(emotion: &str, confidence: f32) -> ExternalEmotionResult {
        ExternalEmotionResult {
            primary_emotion: emotion.to_string(),
            confidence,
            intensity: 0.6,
            tier_used: None,
            analysis_time_ms: None,
            api_calls_made: None,
        }
    }

    fn intr(emotion: &str, confidence: f32) -> IntrinsicEmotionResult {
        IntrinsicEmotionResult {
            primary_emotion: emotion.to_string(),
            confidence,
            intensity: 0.4,
        }
    }

    #[test]
    fn conflicting_emotions_prefer_external_when_confident() {
        let combined = combine_emotion(Some(ext("anger", 0.8)), Some(intr("joy", 0.5))).unwrap();
        assert_eq!(combined.primary_emotion, "anger");
        assert_eq!(combined.source, EmotionSource::External);
    }

    #[test]
    fn conflicting_emotions_fall_back_to_intrinsic_when_external_unsure() {
        let combined = combine_emotion(Some(ext("anger", 0.5)), Some(intr("joy", 0.6))).unwrap();
        assert_eq!(combined.primary_emotion, "joy");
        assert_eq!(combined.source, EmotionSource::Intrinsic);
    }
}
