//! Prompt Assembler (L10): composes the ordered message list handed to the
//! LLM client, enforcing the token budget in two stages (spec §4.10).

use chrono::{DateTime, Utc};
use orchestrator::IntelligenceBundle;

use crate::chat_message::ChatMessage;
use crate::leakage::scan_and_filter;
use crate::memory_render::{render_retrieved_memories_block, RenderableMemory};
use crate::template::{render_character_prompt, TemplateContext};
use crate::token_accountant::{self, CONVERSATION_HISTORY_MAX_TOKENS, SYSTEM_PROMPT_MAX_TOKENS};

/// One prior turn of the conversation, in chronological order.
#[derive(Debug, Clone)]
pub struct PriorTurn {
    pub is_user: bool,
    pub content: String,
}

/// Everything the assembler needs beyond the character's raw persona text
/// and the IntelligenceBundle, gathered by the pipeline controller (L11)
/// from L3/L4/L5.
#[derive(Debug, Clone, Default)]
pub struct AssemblyInput {
    pub relationship_label: Option<String>,
    pub conversation_summary: Option<String>,
    pub retrieved_memories: Vec<RenderableMemory>,
    pub prior_turns: Vec<PriorTurn>,
    pub current_message: String,
    pub attachment_descriptors: Vec<String>,
}

/// Final output of L10: the ordered message list plus optional hints the
/// LLM client (§6) may use when building its own request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<ChatMessage>,
    pub model_hints: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Stateless; every call takes all the context it needs as arguments so the
/// assembler has nothing of its own to guard with a lock.
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Builds the full [`LlmRequest`] for one turn. `persona_text` is the
    /// character's canonical prompt, loaded once at startup by the caller.
    pub fn assemble(
        &self,
        persona_text: &str,
        bundle: &IntelligenceBundle,
        input: &AssemblyInput,
        now: DateTime<Utc>,
    ) -> LlmRequest {
        let conversation_mode = bundle
            .empathy
            .as_ref()
            .map(|_| "responding".to_string());

        let template_ctx = build_template_context(bundle, input, conversation_mode.clone());
        let character_prompt = render_character_prompt(persona_text, &template_ctx);

        // Stage A candidate blocks, highest priority first; character_prompt
        // is handled separately since it is never dropped.
        let time_block = format!("Current time: {}", now.to_rfc3339());
        let relationship_block = relationship_emotion_summary(bundle, input);
        let self_awareness_block = self_awareness_section(bundle);
        let memories_block = render_retrieved_memories_block(&input.retrieved_memories, now);
        let summary_block = input.conversation_summary.clone();

        let mut system_blocks: Vec<(&'static str, Option<String>)> = vec![
            ("character_prompt", Some(character_prompt)),
            ("time_context", Some(time_block)),
            ("relationship_emotion_summary", relationship_block),
            ("self_awareness", self_awareness_block),
            ("retrieved_memories", memories_block),
            ("conversation_summary", summary_block),
        ];

        enforce_stage_a_budget(&mut system_blocks);

        let mut messages: Vec<ChatMessage> = system_blocks
            .into_iter()
            .filter_map(|(_, content)| content)
            .map(ChatMessage::system)
            .collect();

        messages.extend(repair_alternation(&input.prior_turns));

        let mut current = input.current_message.clone();
        if !input.attachment_descriptors.is_empty() {
            current.push_str("\n\n[Attachments]\n");
            current.push_str(&input.attachment_descriptors.join("\n"));
        }
        messages.push(ChatMessage::user(current));

        let (messages, _dropped_tokens) =
            token_accountant::truncate(messages, CONVERSATION_HISTORY_MAX_TOKENS, 2);

        let messages: Vec<ChatMessage> = messages
            .into_iter()
            .map(|m| {
                let (clean, _filtered) = scan_and_filter(&m.content);
                ChatMessage { role: m.role, content: clean }
            })
            .collect();

        LlmRequest { messages, model_hints: None, max_tokens: None }
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn build_template_context(
    bundle: &IntelligenceBundle,
    input: &AssemblyInput,
    conversation_mode: Option<String>,
) -> TemplateContext {
    let emotional_state_context = bundle.emotion.as_ref().map(|e| {
        format!("The user's current emotional state is {} (intensity {:.2}).", e.primary_emotion, e.intensity)
    });
    let external_emotion_context = bundle
        .emotion
        .as_ref()
        .and_then(|e| e.external.as_ref())
        .map(|ext| format!("External emotion analysis: {} (confidence {:.2}).", ext.primary_emotion, ext.confidence));
    let personality_context = bundle
        .self_knowledge
        .as_ref()
        .and_then(|sk| sk.top_motivations.first())
        .map(|m| format!("Core motivation: {}.", m.label));
    let memory_network_context = if input.retrieved_memories.is_empty() {
        None
    } else {
        Some(format!("{} relevant memories available.", input.retrieved_memories.len()))
    };
    let memory_network_status = Some(if input.retrieved_memories.is_empty() { "sparse".to_string() } else { "active".to_string() });

    TemplateContext {
        memory_network_context,
        relationship_context: input.relationship_label.clone(),
        emotional_state_context,
        personality_context,
        external_emotion_context,
        emotional_prediction_context: None,
        proactive_support_context: None,
        emotional_intelligence_context: bundle
            .empathy
            .as_ref()
            .map(|e| format!("Recommended tone: {:?}.", e.primary_style)),
        ai_system_context: None,
        memory_network_status,
        relationship_depth: input.relationship_label.clone(),
        conversation_mode,
    }
}

fn relationship_emotion_summary(bundle: &IntelligenceBundle, input: &AssemblyInput) -> Option<String> {
    let relationship = input.relationship_label.as_deref();
    let mood = bundle
        .emotion
        .as_ref()
        .map(|e| format!("User mood: {} (intensity {:.1}).", e.primary_emotion, e.intensity));

    match (relationship, mood) {
        (Some(r), Some(m)) => Some(format!("Relationship: {r}. {m}")),
        (Some(r), None) => Some(format!("Relationship: {r}.")),
        (None, Some(m)) => Some(m),
        (None, None) => None,
    }
}

fn self_awareness_section(bundle: &IntelligenceBundle) -> Option<String> {
    let sk = bundle.self_knowledge.as_ref()?;
    let profile_confidence = sk.profile.as_ref().map(|p| p.confidence).unwrap_or(0.0);
    if profile_confidence < 0.5 {
        return None;
    }

    let motivations: Vec<&str> = sk.top_motivations.iter().take(3).map(|m| m.label.as_str()).collect();
    let patterns: Vec<String> = sk
        .behavioral_patterns
        .iter()
        .take(5)
        .map(|p| format!("{:?} ({} members)", p.relationship_type, p.members.len()))
        .collect();

    if motivations.is_empty() && patterns.is_empty() {
        return None;
    }

    let mut out = String::from("Self-awareness: ");
    if !motivations.is_empty() {
        out.push_str(&format!("driven by {}. ", motivations.join(", ")));
    }
    if !patterns.is_empty() {
        out.push_str(&format!("recurring patterns: {}.", patterns.join(", ")));
    }
    Some(out.trim_end().to_string())
}

/// Drops lower-priority blocks from the tail of the priority list until the
/// sum of their estimated token costs fits [`SYSTEM_PROMPT_MAX_TOKENS`].
/// `character_prompt` (index 0) is never touched.
fn enforce_stage_a_budget(blocks: &mut [(&'static str, Option<String>)]) {
    // Drop order: summary -> self-awareness -> retrieved memories -> relationship summary.
    let drop_order = ["conversation_summary", "self_awareness", "retrieved_memories", "relationship_emotion_summary"];

    loop {
        let total: usize = blocks
            .iter()
            .filter_map(|(_, c)| c.as_deref())
            .map(token_accountant::estimate)
            .sum();
        if total <= SYSTEM_PROMPT_MAX_TOKENS {
            break;
        }
        let Some(name) = drop_order
            .iter()
            .find(|name| blocks.iter().any(|(n, c)| n == *name && c.is_some()))
        else {
            break;
        };
        if let Some(slot) = blocks.iter_mut().find(|(n, _)| n == name) {
            slot.1 = None;
        }
    }
}

/// Repairs a non-alternating prior-turns sequence by dropping the minimum
/// number of adjacent same-role turns from the oldest end (spec §4.10 step 7).
fn repair_alternation(turns: &[PriorTurn]) -> Vec<ChatMessage> {
    let mut repaired: Vec<&PriorTurn> = Vec::with_capacity(turns.len());
    for turn in turns {
        if let Some(last) = repaired.last() {
            if last.is_user == turn.is_user {
                repaired.pop();
            }
        }
        repaired.push(turn);
    }
    repaired
        .into_iter()
        .map(|t| if t.is_user { ChatMessage::user(t.content.clone()) } else { ChatMessage::assistant(t.content.clone()) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_bundle() -> IntelligenceBundle {
        IntelligenceBundle::default()
    }

    #[test]
    fn character_prompt_survives_even_when_everything_else_is_dropped() {
        let mut blocks: Vec<(&'static str, Option<String>)> = vec![
            ("character_prompt", Some("x".repeat(SYSTEM_PROMPT_MAX_TOKENS * 4))),
            ("time_context", Some("time".to_string())),
            ("relationship_emotion_summary", Some("y".repeat(40_000))),
            ("self_awareness", Some("z".repeat(40_000))),
            ("retrieved_memories", Some("m".repeat(40_000))),
            ("conversation_summary", Some("s".repeat(40_000))),
        ];
        enforce_stage_a_budget(&mut blocks);
        assert!(blocks[0].1.is_some());
        assert!(blocks[5].1.is_none());
        assert!(blocks[4].1.is_none());
        assert!(blocks[3].1.is_none());
    }

    #[test]
    fn non_alternating_prior_turns_are_repaired_from_the_oldest_end() {
        let turns = vec![
            PriorTurn { is_user: true, content: "a".into() },
            PriorTurn { is_user: true, content: "b".into() },
            PriorTurn { is_user: false, content: "c".into() },
        ];
        let repaired = repair_alternation(&turns);
        assert_eq!(repaired.len(), 2);
        assert_eq!(repaired[0].content, "b");
        assert_eq!(repaired[1].content, "c");
    }

    #[test]
    fn assemble_produces_system_messages_then_prior_turns_then_current_user_message() {
        let assembler = PromptAssembler::new();
        let bundle = empty_bundle();
        let input = AssemblyInput {
            relationship_label: Some("friend (12 interactions)".to_string()),
            conversation_summary: None,
            retrieved_memories: vec![],
            prior_turns: vec![
                PriorTurn { is_user: true, content: "hi".into() },
                PriorTurn { is_user: false, content: "hello!".into() },
            ],
            current_message: "how are you?".to_string(),
            attachment_descriptors: vec![],
        };
        let request = assembler.assemble("I am Elena, a marine biologist.", &bundle, &input, Utc::now());
        assert!(request.messages[0].is_system());
        assert!(request.messages.last().unwrap().content.contains("how are you?"));
    }

    #[test]
    fn attachments_are_appended_to_the_current_message() {
        let assembler = PromptAssembler::new();
        let bundle = empty_bundle();
        let input = AssemblyInput {
            current_message: "look at this".to_string(),
            attachment_descriptors: vec!["a photo of a coral reef".to_string()],
            ..Default::default()
        };
        let request = assembler.assemble("persona", &bundle, &input, Utc::now());
        let last = request.messages.last().unwrap();
        assert!(last.content.contains("coral reef"));
    }
}
