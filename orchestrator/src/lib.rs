//! Parallel Intelligence Orchestrator (L9): fans out emotion (external +
//! intrinsic), context-switch detection (L6), and empathy calibration +
//! self-knowledge (L7/L8) concurrently and fans the results back in.

mod combine;
mod external_emotion;
mod intrinsic_emotion;
mod orchestrator;
mod types;

pub use combine::combine_emotion;
pub use external_emotion::ExternalEmotionClient;
pub use intrinsic_emotion::analyze as analyze_intrinsic_emotion;
pub use orchestrator::{
    IntelligenceOrchestrator, OrchestratorInput, DEFAULT_GLOBAL_DEADLINE, DEFAULT_PER_TASK_TIMEOUT,
};
pub use types::{
    CombinedEmotion, EmotionSource, ExternalEmotionResult, IntelligenceBundle, IntrinsicEmotionResult,
    SelfKnowledgeSummary,
};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use intelligence::ConversationMode;
    use std::sync::Arc;
    use storage::KnowledgeStore;

    struct StubExternalEmotion;

    #[async_trait]
    impl ExternalEmotionClient for StubExternalEmotion {
        async fn analyze(&self, _user_id: &str, _text: &str, _history: &[String]) -> anyhow::Result<ExternalEmotionResult> {
            Ok(ExternalEmotionResult {
                primary_emotion: "joy".to_string(),
                confidence: 0.9,
                intensity: 0.7,
                tier_used: Some("fast".to_string()),
                analysis_time_ms: Some(12),
                api_calls_made: Some(1),
            })
        }
    }

    #[tokio::test]
    async fn fan_out_produces_a_complete_bundle_when_all_tasks_succeed() {
        let store = KnowledgeStore::new("sqlite::memory:").await.unwrap();
        let orchestrator = IntelligenceOrchestrator::new(Some(Arc::new(StubExternalEmotion)));

        let input = OrchestratorInput {
            character: "elena",
            user_id: "user-1",
            message: "I'm so excited about this, it's wonderful!",
            mode: ConversationMode::Casual,
            recent_history: vec![],
            previous_turn: None,
        };

        let bundle = orchestrator.run(input, &store).await;
        assert!(bundle.emotion.is_some());
        assert_eq!(bundle.emotion.unwrap().primary_emotion, "joy");
        assert!(bundle.empathy.is_some());
        assert!(bundle.computed_at.is_some());
    }

    #[tokio::test]
    async fn missing_previous_turn_yields_no_context_switch_without_failing_the_bundle() {
        let store = KnowledgeStore::new("sqlite::memory:").await.unwrap();
        let orchestrator = IntelligenceOrchestrator::new(None);

        let input = OrchestratorInput {
            character: "elena",
            user_id: "user-2",
            message: "just checking in",
            mode: ConversationMode::Casual,
            recent_history: vec![],
            previous_turn: None,
        };

        let bundle = orchestrator.run(input, &store).await;
        assert!(bundle.context_switches.is_empty());
        assert!(bundle.empathy.is_some());
    }
}
