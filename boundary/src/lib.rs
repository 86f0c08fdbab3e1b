//! Boundary Manager (L5).
//!
//! Owns one in-memory, process-local session table keyed by `(user_id,
//! channel_id)`. Durability of the conversation itself lives in the vector
//! memory store (L3); this crate only tracks session/topic lifecycle.

mod keywords;
mod manager;
mod types;

pub use keywords::{extract_topic_keywords, relative_time, resumption_bridge};
pub use manager::{
    BoundaryConfig, BoundaryManager, ProcessResult, Summarizer, DEFAULT_ABSOLUTE_TIMEOUT,
    DEFAULT_KEEPALIVE_TIMEOUT, DEFAULT_MAX_SESSIONS, DEFAULT_SUMMARIZATION_THRESHOLD,
};
pub use types::{
    ContextView, ConversationSession, SessionState, Topic, TopicResolution, TopicView, TransitionKind,
    TOPIC_HISTORY_CAP,
};
