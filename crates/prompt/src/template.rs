//! Character prompt variable substitution (spec §4.10 step 1).
//!
//! Twelve named placeholders may appear in a character's canonical persona
//! text; any that the current turn has no content for are replaced with an
//! empty string rather than left in the text, so a partially-populated
//! turn never leaks a raw `{…_CONTEXT}` token to the model (or, via an
//! echoed reply, to the user).

/// All variable names a character prompt may reference, matched literally
/// including the surrounding braces.
pub const TEMPLATE_VARIABLES: &[&str] = &[
    "{MEMORY_NETWORK_CONTEXT}",
    "{RELATIONSHIP_CONTEXT}",
    "{EMOTIONAL_STATE_CONTEXT}",
    "{PERSONALITY_CONTEXT}",
    "{EXTERNAL_EMOTION_CONTEXT}",
    "{EMOTIONAL_PREDICTION_CONTEXT}",
    "{PROACTIVE_SUPPORT_CONTEXT}",
    "{EMOTIONAL_INTELLIGENCE_CONTEXT}",
    "{AI_SYSTEM_CONTEXT}",
    "{MEMORY_NETWORK_STATUS}",
    "{RELATIONSHIP_DEPTH}",
    "{CONVERSATION_MODE}",
];

/// Values to substitute into a character prompt, one per [`TEMPLATE_VARIABLES`]
/// slot. Every field defaults to `None`, which substitutes to `""`.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub memory_network_context: Option<String>,
    pub relationship_context: Option<String>,
    pub emotional_state_context: Option<String>,
    pub personality_context: Option<String>,
    pub external_emotion_context: Option<String>,
    pub emotional_prediction_context: Option<String>,
    pub proactive_support_context: Option<String>,
    pub emotional_intelligence_context: Option<String>,
    pub ai_system_context: Option<String>,
    pub memory_network_status: Option<String>,
    pub relationship_depth: Option<String>,
    pub conversation_mode: Option<String>,
}

impl TemplateContext {
    fn slots(&self) -> [(&'static str, &Option<String>); 12] {
        [
            ("{MEMORY_NETWORK_CONTEXT}", &self.memory_network_context),
            ("{RELATIONSHIP_CONTEXT}", &self.relationship_context),
            ("{EMOTIONAL_STATE_CONTEXT}", &self.emotional_state_context),
            ("{PERSONALITY_CONTEXT}", &self.personality_context),
            ("{EXTERNAL_EMOTION_CONTEXT}", &self.external_emotion_context),
            ("{EMOTIONAL_PREDICTION_CONTEXT}", &self.emotional_prediction_context),
            ("{PROACTIVE_SUPPORT_CONTEXT}", &self.proactive_support_context),
            ("{EMOTIONAL_INTELLIGENCE_CONTEXT}", &self.emotional_intelligence_context),
            ("{AI_SYSTEM_CONTEXT}", &self.ai_system_context),
            ("{MEMORY_NETWORK_STATUS}", &self.memory_network_status),
            ("{RELATIONSHIP_DEPTH}", &self.relationship_depth),
            ("{CONVERSATION_MODE}", &self.conversation_mode),
        ]
    }
}

/// Substitutes every recognized `{…}` placeholder in `persona_text`. Any
/// placeholder from [`TEMPLATE_VARIABLES`] not set on `ctx` becomes `""`; any
/// placeholder-shaped text NOT in [`TEMPLATE_VARIABLES`] is left untouched
/// (it's ordinary persona prose, not a variable).
pub fn render_character_prompt(persona_text: &str, ctx: &TemplateContext) -> String {
    let mut out = persona_text.to_string();
    for (placeholder, value) in ctx.slots() {
        let replacement = value.as_deref().unwrap_or("");
        out = out.replace(placeholder, replacement);
    }
    out
}
