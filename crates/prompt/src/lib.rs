//! # Prompt
//!
//! Token Accountant (L1) and Prompt Assembler (L10): estimates and enforces
//! token budgets, composes the ordered `{role, content}` list handed to the
//! LLM client, and runs the outbound leakage scanner over the result.
//!
//! ## External interactions
//!
//! - **AI models**: the assembled `LlmRequest` is sent to LLM APIs through
//!   the `llm-client` crate.

mod assembler;
mod chat_message;
mod leakage;
mod memory_render;
mod template;
mod token_accountant;

pub use assembler::{AssemblyInput, LlmRequest, PromptAssembler, PriorTurn};
pub use chat_message::{ChatMessage, MessageRole};
pub use leakage::{scan_and_filter, FILTERED_PLACEHOLDER};
pub use memory_render::{
    relative_time_label, render_retrieved_memories_block, RenderableMemory, GLOBAL_FACT_USER_ID,
    MIN_MEMORY_AGE_FOR_RETRIEVAL,
};
pub use template::{render_character_prompt, TemplateContext, TEMPLATE_VARIABLES};
pub use token_accountant::{
    estimate, truncate, CHARS_PER_TOKEN, CONVERSATION_HISTORY_MAX_TOKENS, SYSTEM_PROMPT_MAX_TOKENS,
    TOTAL_TOKEN_BUDGET, TRUNCATION_MARKER,
};
