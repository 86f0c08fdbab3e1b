//! Pipeline Controller (L11): wires L1-L10 into one per-turn flow driven by
//! a platform-neutral [`PlatformMessage`] in, [`PlatformReply`] out (spec
//! §4.11). This is the only crate in the workspace that talks to every other
//! layer at once; everything it calls is either stateless or already owns
//! its own internal locking.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use intelligence::{classify_emotion, classify_intent, classify_mode, ContextSnapshot, EmotionCategory, FeedbackIndicators};
use memory::{QueryVectors, VectorMemoryStore};
use memory_core::{MemoryRecord, MemoryRole, VectorName};
use memory_strategies::QueryClassifier;
use orchestrator::{IntelligenceOrchestrator, OrchestratorInput};
use prompt::{AssemblyInput, PriorTurn, PromptAssembler, RenderableMemory};
use storage::KnowledgeStore;
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use crate::chunk::chunk_reply;
use crate::fact_extraction::{extract_facts, extract_preferences};
use crate::safety::{is_unsafe_input, REJECTION_REPLY};
use crate::types::{PipelineConfig, PlatformMessage, PlatformReply, TurnOutcome};
use boundary::BoundaryManager;
use embedding::EmbeddingService;
use llm_client::{persona_apology, LlmClient, LlmFailureKind};

/// Keyword markers for "this query is about a specific past point in time",
/// the `is_temporal` signal the query classifier (L2) expects from upstream.
const TEMPORAL_MARKERS: &[&str] = &[
    "yesterday", "last time", "earlier", "before", "previously", "first time", "last week", "a while ago",
];

fn looks_temporal(content: &str) -> bool {
    let lower = content.to_lowercase();
    TEMPORAL_MARKERS.iter().any(|m| lower.contains(m))
}

const GRATITUDE_MARKERS: &[&str] = &["thank", "thanks", "appreciate", "grateful"];
const DE_ESCALATION_MARKERS: &[&str] = &["feel better", "calmer", "makes sense", "that helps", "ok thanks", "i see"];
const REPEATED_FRUSTRATION_MARKERS: &[&str] = &["still frustrated", "still not", "again?!", "not helping", "useless"];
const DIFFERENT_RESPONSE_MARKERS: &[&str] = &["not what i asked", "that's not helpful", "try again", "different answer"];
const ESCALATION_MARKERS: &[&str] = &["furious", "ridiculous", "unacceptable", "done with this", "forget it"];

/// Infers `learn`'s feedback indicators from the surface signal of the
/// user's next message (spec §4.7/§4.11): there is no explicit rating
/// channel, so the wording of the following turn stands in for it.
fn infer_feedback_indicators(next_message: &str, next_emotion: EmotionCategory) -> FeedbackIndicators {
    let lower = next_message.to_lowercase();
    FeedbackIndicators {
        conversation_continued: true,
        de_escalation: DE_ESCALATION_MARKERS.iter().any(|m| lower.contains(m)),
        gratitude_expressed: GRATITUDE_MARKERS.iter().any(|m| lower.contains(m)),
        more_detail_shared: next_message.split_whitespace().count() > 25,
        positive_sentiment: next_emotion == EmotionCategory::Joy,
        abrupt_end: next_message.trim().len() < 4,
        repeated_frustration: next_emotion == EmotionCategory::Frustration
            && REPEATED_FRUSTRATION_MARKERS.iter().any(|m| lower.contains(m)),
        requested_different_response: DIFFERENT_RESPONSE_MARKERS.iter().any(|m| lower.contains(m)),
        escalation: ESCALATION_MARKERS.iter().any(|m| lower.contains(m)),
    }
}

/// Rough intensity estimate from the deterministic emotion category, used
/// only to feed the query classifier's `emotional_intensity` signal before
/// the orchestrator's own (richer) emotion analysis has run.
fn rough_emotional_intensity(category: EmotionCategory) -> f32 {
    match category {
        EmotionCategory::Neutral => 0.1,
        EmotionCategory::Joy => 0.5,
        EmotionCategory::Frustration | EmotionCategory::Sadness | EmotionCategory::Anxiety => 0.7,
    }
}

fn classify_llm_failure(err: &anyhow::Error) -> LlmFailureKind {
    let msg = err.to_string().to_lowercase();
    if msg.contains("timeout") || msg.contains("timed out") {
        LlmFailureKind::Timeout
    } else if msg.contains("rate limit") || msg.contains("429") || msg.contains("too many requests") {
        LlmFailureKind::RateLimit
    } else if msg.contains("connect") || msg.contains("connection") || msg.contains("dns") {
        LlmFailureKind::Connection
    } else {
        LlmFailureKind::Generic
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct ConversantKey {
    user_id: String,
    channel_id: String,
}

/// Wires every L1-L10 component behind one entrypoint, [`PipelineController::process_message`].
pub struct PipelineController {
    config: PipelineConfig,
    persona_text: String,
    boundary: Arc<BoundaryManager>,
    memory_store: Arc<dyn VectorMemoryStore>,
    knowledge_store: Arc<KnowledgeStore>,
    embedder: Arc<dyn EmbeddingService>,
    classifier: QueryClassifier,
    orchestrator: Arc<IntelligenceOrchestrator>,
    assembler: PromptAssembler,
    llm: Arc<dyn LlmClient>,
    previous_turns: RwLock<HashMap<ConversantKey, ContextSnapshot>>,
}

impl PipelineController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PipelineConfig,
        persona_text: String,
        boundary: Arc<BoundaryManager>,
        memory_store: Arc<dyn VectorMemoryStore>,
        knowledge_store: Arc<KnowledgeStore>,
        embedder: Arc<dyn EmbeddingService>,
        orchestrator: Arc<IntelligenceOrchestrator>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            config,
            persona_text,
            boundary,
            memory_store,
            knowledge_store,
            embedder,
            classifier: QueryClassifier::new(),
            orchestrator,
            assembler: PromptAssembler::new(),
            llm,
            previous_turns: RwLock::new(HashMap::new()),
        }
    }

    /// Runs the full per-turn flow under the configured global deadline,
    /// never letting a panic-free error escape as anything other than a
    /// persona-appropriate reply (spec §7).
    #[instrument(skip(self, msg), fields(character = %self.config.character, user_id = %msg.user_id))]
    pub async fn process_message(&self, msg: &PlatformMessage) -> (PlatformReply, TurnOutcome) {
        match tokio::time::timeout(self.config.global_turn_deadline, self.run_turn(msg)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("pipeline controller hit the global turn deadline");
                let text = persona_apology(LlmFailureKind::Timeout).to_string();
                (PlatformReply::single(text), TurnOutcome::TimedOut)
            }
        }
    }

    async fn run_turn(&self, msg: &PlatformMessage) -> (PlatformReply, TurnOutcome) {
        if is_unsafe_input(&msg.content) {
            return (PlatformReply::single(REJECTION_REPLY), TurnOutcome::Rejected);
        }

        let process_result = self
            .boundary
            .process_message(&msg.user_id, &msg.channel_id, &msg.content, msg.timestamp)
            .await;
        let context_view = self
            .boundary
            .get_conversation_context(&msg.user_id, &msg.channel_id, true)
            .await;

        let mode = classify_mode(&msg.content);
        let emotion_category = classify_emotion(&msg.content);
        let emotional_intensity = rough_emotional_intensity(emotion_category);
        let is_temporal = looks_temporal(&msg.content);
        let (_category, strategy) = self.classifier.classify(&msg.content, emotional_intensity, is_temporal);

        let query_embedding = match self.embedder.embed(&msg.content).await {
            Ok(v) => v,
            Err(err) => {
                warn!(error = %err, "query embedding failed, continuing with no vector retrieval");
                Vec::new()
            }
        };
        let query_vectors = QueryVectors::new()
            .with(VectorName::Content, query_embedding.clone())
            .with(VectorName::Emotion, query_embedding.clone())
            .with(VectorName::Semantic, query_embedding.clone());

        let key = ConversantKey { user_id: msg.user_id.clone(), channel_id: msg.channel_id.clone() };
        let previous_turn = self.previous_turns.read().await.get(&key).cloned();

        if let Some(used_style) = previous_turn.as_ref().and_then(|p| p.previous_empathy_style) {
            let feedback = infer_feedback_indicators(&msg.content, emotion_category);
            let previous_emotion = previous_turn.as_ref().expect("checked above").previous_emotion;
            self.orchestrator.learn_empathy(&msg.user_id, previous_emotion, used_style, &feedback).await;
        }

        let retrieval_limit = self.config.retrieval_limit;
        let retrieved_fut = async {
            if strategy.fuse || !strategy.vector_names.is_empty() {
                self.memory_store
                    .search(&self.config.character, &msg.user_id, &query_vectors, &strategy, retrieval_limit)
                    .await
            } else {
                self.memory_store.scroll_recent(&self.config.character, &msg.user_id, retrieval_limit).await
            }
        };
        let history_fut = self.memory_store.history(&self.config.character, &msg.user_id, self.config.prior_turns_window);
        let facts_fut = self.knowledge_store.get_user_facts(&msg.user_id, retrieval_limit as i64);
        let prefs_fut = self.knowledge_store.get_user_preferences(&msg.user_id, retrieval_limit as i64);
        let orchestrator_fut = self.orchestrator.run(
            OrchestratorInput {
                character: &self.config.character,
                user_id: &msg.user_id,
                message: &msg.content,
                mode,
                recent_history: Vec::new(),
                previous_turn: previous_turn.clone(),
            },
            &self.knowledge_store,
        );

        let (retrieved, history, facts, prefs, bundle) =
            tokio::join!(retrieved_fut, history_fut, facts_fut, prefs_fut, orchestrator_fut);

        let retrieved = retrieved.unwrap_or_else(|err| {
            warn!(error = %err, "memory search failed, continuing without retrieved memories");
            Vec::new()
        });
        let history = history.unwrap_or_else(|err| {
            warn!(error = %err, "memory history lookup failed, continuing without prior turns");
            Vec::new()
        });
        let facts = facts.unwrap_or_else(|err| {
            warn!(error = %err, "fact lookup failed, continuing without facts");
            Vec::new()
        });
        let prefs = prefs.unwrap_or_else(|err| {
            warn!(error = %err, "preference lookup failed, continuing without preferences");
            Vec::new()
        });

        let now = Utc::now();
        let mut retrieved_memories: Vec<RenderableMemory> = retrieved.iter().map(RenderableMemory::from).collect();
        retrieved_memories.extend(facts.iter().map(RenderableMemory::from));
        retrieved_memories.extend(prefs.iter().map(RenderableMemory::from));

        let prior_turns: Vec<PriorTurn> = history
            .iter()
            .rev()
            .map(|record| PriorTurn {
                is_user: record.role == MemoryRole::User,
                content: record.content.clone(),
            })
            .collect();

        let relationship_label = Some(format!("{} interactions so far", process_result.session.message_count));
        let conversation_summary = match (&process_result.bridge, context_view.and_then(|c| c.summary)) {
            (Some(bridge), Some(summary)) => Some(format!("{bridge} {summary}")),
            (Some(bridge), None) => Some(bridge.clone()),
            (None, Some(summary)) => Some(summary),
            (None, None) => None,
        };

        let assembly_input = AssemblyInput {
            relationship_label,
            conversation_summary,
            retrieved_memories,
            prior_turns,
            current_message: msg.content.clone(),
            attachment_descriptors: msg.attachments.iter().map(|a| format!("[attachment: {}]", a.content_type)).collect(),
        };

        let request = self.assembler.assemble(&self.persona_text, &bundle, &assembly_input, now);

        let reply_text = match self.llm.chat_completion(&request.messages).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "LLM chat completion failed");
                let kind = classify_llm_failure(&err);
                let reply = PlatformReply::single(persona_apology(kind).to_string());
                return (reply, TurnOutcome::LlmFailed);
            }
        };

        let (clean_reply, _was_filtered) = prompt::scan_and_filter(&reply_text);

        self.previous_turns.write().await.insert(
            key,
            ContextSnapshot {
                previous_message: msg.content.clone(),
                previous_mode: mode,
                previous_intent: classify_intent(&msg.content),
                previous_emotion_intensity: bundle.emotion.as_ref().map(|e| e.intensity).unwrap_or(emotional_intensity),
                previous_timestamp: msg.timestamp,
                previous_emotion: emotion_category,
                previous_empathy_style: bundle.empathy.as_ref().map(|e| e.primary_style),
            },
        );

        self.persist_turn(msg, &clean_reply, &query_embedding).await;

        let chunks = chunk_reply(&clean_reply, self.config.reply_chunk_size);
        (PlatformReply { text: clean_reply, chunks }, TurnOutcome::Replied)
    }

    /// Best-effort persistence of the turn into L3 (vector memory) and L4
    /// (extracted facts/preferences). Failures are logged, never surfaced:
    /// a reply the user already received must not be retried or rejected
    /// just because its aftermath couldn't be written down.
    async fn persist_turn(&self, msg: &PlatformMessage, reply_text: &str, user_embedding: &[f32]) {
        let user_record = MemoryRecord::new(msg.user_id.clone(), MemoryRole::User, msg.content.clone())
            .with_embedding(VectorName::Content, user_embedding.to_vec())
            .with_embedding(VectorName::Emotion, user_embedding.to_vec())
            .with_embedding(VectorName::Semantic, user_embedding.to_vec());
        if let Err(err) = self.memory_store.store(&self.config.character, user_record).await {
            warn!(error = %err, "failed to persist user turn");
        }

        match self.embedder.embed(reply_text).await {
            Ok(reply_embedding) => {
                let assistant_record = MemoryRecord::new(msg.user_id.clone(), MemoryRole::Assistant, reply_text.to_string())
                    .with_embedding(VectorName::Content, reply_embedding.clone())
                    .with_embedding(VectorName::Emotion, reply_embedding.clone())
                    .with_embedding(VectorName::Semantic, reply_embedding);
                if let Err(err) = self.memory_store.store(&self.config.character, assistant_record).await {
                    warn!(error = %err, "failed to persist assistant turn");
                }
            }
            Err(err) => warn!(error = %err, "failed to embed assistant reply for persistence"),
        }

        for fact in extract_facts(&msg.user_id, &msg.content) {
            if let Err(err) = self.knowledge_store.upsert_fact(&fact).await {
                warn!(error = %err, "failed to upsert extracted fact");
            }
        }
        for pref in extract_preferences(&msg.user_id, &msg.content) {
            if let Err(err) = self.knowledge_store.upsert_preference(&pref).await {
                warn!(error = %err, "failed to upsert extracted preference");
            }
        }
    }
}
