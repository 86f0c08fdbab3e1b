//! Intrinsic (local, no network) emotion analysis: phase-2 of the original
//! four-task fan-out. Purely a keyword-weighted heuristic, deliberately
//! simple since the external API is the primary emotion signal when present.

use crate::types::IntrinsicEmotionResult;

const EMOTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("joy", &["happy", "excited", "great", "wonderful", "thrilled", "love"]),
    ("sadness", &["sad", "down", "depressed", "hurt", "upset", "lonely"]),
    ("anger", &["angry", "furious", "frustrated", "annoyed", "fed up"]),
    ("fear", &["scared", "afraid", "anxious", "worried", "nervous"]),
    ("surprise", &["wow", "shocked", "surprised", "unexpected"]),
];

pub fn analyze(message: &str) -> IntrinsicEmotionResult {
    let lower = message.to_lowercase();
    let mut best: Option<(&str, usize)> = None;
    for (emotion, keywords) in EMOTION_KEYWORDS {
        let hits = keywords.iter().filter(|k| lower.contains(**k)).count();
        if hits > 0 && best.map(|(_, n)| hits > n).unwrap_or(true) {
            best = Some((emotion, hits));
        }
    }

    match best {
        Some((emotion, hits)) => {
            let intensity = (hits as f32 / 3.0).min(1.0);
            IntrinsicEmotionResult {
                primary_emotion: emotion.to_string(),
                confidence: (0.4 + intensity * 0.3).min(0.9),
                intensity,
            }
        }
        None => IntrinsicEmotionResult {
            primary_emotion: "neutral".to_string(),
            confidence: 0.5,
            intensity: 0.1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_dominant_emotion_by_keyword_count() {
        let result = analyze("I am so angry and frustrated, this is fed up territory");
        assert_eq!(result.primary_emotion, "anger");
    }

    #[test]
    fn neutral_message_yields_low_intensity_neutral() {
        let result = analyze("the meeting is at three o'clock");
        assert_eq!(result.primary_emotion, "neutral");
    }
}
