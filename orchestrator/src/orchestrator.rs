//! Parallel Intelligence Orchestrator (L9).
//!
//! Fans out the four per-turn analyses concurrently, waits for all of them
//! under a per-task timeout and a global deadline, and fans in whatever
//! completed into one [`IntelligenceBundle`]. A task that errors or times
//! out contributes `None` rather than failing the turn — cancellation on
//! drop of the un-awaited futures is what satisfies the "stop wasting work
//! past the deadline" requirement, no explicit abort bookkeeping needed.

use crate::combine::combine_emotion;
use crate::external_emotion::ExternalEmotionClient;
use crate::intrinsic_emotion;
use crate::types::{IntelligenceBundle, SelfKnowledgeSummary};
use chrono::Utc;
use intelligence::{ContextSnapshot, ContextSwitchDetector, ConversationMode, EmpathyCalibrator, TurnSignals};
use self_knowledge::{Extractor, GraphBuilder, TraitDiscovery};
use std::sync::Arc;
use std::time::Duration;
use storage::KnowledgeStore;
use tracing::warn;

pub const DEFAULT_PER_TASK_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_GLOBAL_DEADLINE: Duration = Duration::from_secs(8);

pub struct OrchestratorInput<'a> {
    pub character: &'a str,
    pub user_id: &'a str,
    pub message: &'a str,
    pub mode: ConversationMode,
    pub recent_history: Vec<String>,
    pub previous_turn: Option<ContextSnapshot>,
}

pub struct IntelligenceOrchestrator {
    context_switch_detector: ContextSwitchDetector,
    empathy_calibrator: EmpathyCalibrator,
    graph_builder: GraphBuilder,
    trait_discovery: TraitDiscovery,
    external_emotion_client: Option<Arc<dyn ExternalEmotionClient>>,
    per_task_timeout: Duration,
    global_deadline: Duration,
}

impl IntelligenceOrchestrator {
    pub fn new(external_emotion_client: Option<Arc<dyn ExternalEmotionClient>>) -> Self {
        Self {
            context_switch_detector: ContextSwitchDetector::new(),
            empathy_calibrator: EmpathyCalibrator::new(),
            graph_builder: GraphBuilder::new(),
            trait_discovery: TraitDiscovery::new(),
            external_emotion_client,
            per_task_timeout: DEFAULT_PER_TASK_TIMEOUT,
            global_deadline: DEFAULT_GLOBAL_DEADLINE,
        }
    }

    pub fn with_timeouts(mut self, per_task_timeout: Duration, global_deadline: Duration) -> Self {
        self.per_task_timeout = per_task_timeout;
        self.global_deadline = global_deadline;
        self
    }

    /// Feeds the outcome of a style actually used back into L7's learned
    /// preferences (spec §4.11 persistence step). The controller calls this
    /// after the turn with feedback indicators inferred from the surface
    /// signals of the user's next reply, or a provisional self-estimate.
    pub async fn learn_empathy(
        &self,
        user_id: &str,
        emotion: intelligence::EmotionCategory,
        used_style: intelligence::EmpathyStyle,
        feedback: &intelligence::FeedbackIndicators,
    ) {
        self.empathy_calibrator.learn(user_id, emotion, used_style, feedback).await;
    }

    pub async fn run(&self, input: OrchestratorInput<'_>, store: &KnowledgeStore) -> IntelligenceBundle {
        let outcome = tokio::time::timeout(self.global_deadline, self.fan_out(&input, store)).await;

        match outcome {
            Ok(mut bundle) => {
                bundle.computed_at = Some(Utc::now());
                bundle
            }
            Err(_) => {
                warn!(character = input.character, user_id = input.user_id, "intelligence orchestrator hit global deadline");
                IntelligenceBundle::default()
            }
        }
    }

    async fn fan_out(&self, input: &OrchestratorInput<'_>, store: &KnowledgeStore) -> IntelligenceBundle {
        let (external, intrinsic, context_switches, phase4) = tokio::join!(
            self.run_external_emotion(input),
            self.run_intrinsic_emotion(input),
            self.run_context_switch(input),
            self.run_phase4(input, store),
        );

        let emotion = combine_emotion(external, intrinsic);
        let (empathy, self_knowledge) = phase4.unwrap_or((None, None));

        IntelligenceBundle {
            emotion,
            context_switches: context_switches.unwrap_or_default(),
            empathy,
            self_knowledge,
            computed_at: None,
        }
    }

    async fn run_external_emotion(&self, input: &OrchestratorInput<'_>) -> Option<crate::types::ExternalEmotionResult> {
        let client = self.external_emotion_client.as_ref()?;
        let fut = client.analyze(input.user_id, input.message, &input.recent_history);
        match tokio::time::timeout(self.per_task_timeout, fut).await {
            Ok(Ok(result)) => Some(result),
            Ok(Err(err)) => {
                warn!(error = %err, "external emotion analysis failed");
                None
            }
            Err(_) => {
                warn!("external emotion analysis timed out");
                None
            }
        }
    }

    async fn run_intrinsic_emotion(&self, input: &OrchestratorInput<'_>) -> Option<crate::types::IntrinsicEmotionResult> {
        let message = input.message.to_string();
        let fut = async move { intrinsic_emotion::analyze(&message) };
        match tokio::time::timeout(self.per_task_timeout, fut).await {
            Ok(result) => Some(result),
            Err(_) => {
                warn!("intrinsic emotion analysis timed out");
                None
            }
        }
    }

    async fn run_context_switch(&self, input: &OrchestratorInput<'_>) -> Option<Vec<intelligence::ContextSwitch>> {
        let previous = input.previous_turn.clone()?;
        let detector = &self.context_switch_detector;
        let signals: TurnSignals = detector.analyze_turn(input.message, 0.0, Utc::now());
        let fut = async move { detector.detect(&signals, &previous) };
        match tokio::time::timeout(self.per_task_timeout, fut).await {
            Ok(result) => Some(result),
            Err(_) => {
                warn!("context switch detection timed out");
                None
            }
        }
    }

    async fn run_phase4(
        &self,
        input: &OrchestratorInput<'_>,
        store: &KnowledgeStore,
    ) -> Option<(Option<intelligence::EmpathyCalibration>, Option<SelfKnowledgeSummary>)> {
        let fut = self.phase4_inner(input, store);
        match tokio::time::timeout(self.per_task_timeout, fut).await {
            Ok(result) => Some(result),
            Err(_) => {
                warn!("phase-4 human-like intelligence timed out");
                None
            }
        }
    }

    async fn phase4_inner(
        &self,
        input: &OrchestratorInput<'_>,
        store: &KnowledgeStore,
    ) -> (Option<intelligence::EmpathyCalibration>, Option<SelfKnowledgeSummary>) {
        let empathy = self
            .empathy_calibrator
            .calibrate(input.user_id, input.message, input.mode, &input.recent_history)
            .await;

        let self_knowledge = match Extractor::new(store).extract(input.character).await {
            Ok(profile) => {
                let graph = self.graph_builder.build(&profile);
                let discovery = self.trait_discovery.discover(&profile, &graph);
                Some(SelfKnowledgeSummary {
                    profile: Some(profile),
                    top_motivations: discovery.motivations.into_iter().take(3).collect(),
                    behavioral_patterns: discovery.patterns,
                })
            }
            Err(err) => {
                warn!(error = %err, "self-knowledge extraction failed");
                None
            }
        };

        (Some(empathy), self_knowledge)
    }
}
