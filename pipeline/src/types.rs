//! Platform-neutral message/reply types the controller consumes and emits
//! (spec §6): adapters translate a chat platform's wire format into a
//! [`PlatformMessage`] and render a [`PlatformReply`] back out.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// An opaque attachment the platform adapter already fetched; the pipeline
/// never reaches out to the platform to resolve one itself.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Inbound unit handed to the pipeline controller by a platform adapter.
#[derive(Debug, Clone)]
pub struct PlatformMessage {
    pub platform: String,
    pub user_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub timestamp: DateTime<Utc>,
}

/// Outbound reply. `chunks` is populated when `text` exceeds the platform's
/// size cap (spec §4.11 step 7, default 2,000 characters).
#[derive(Debug, Clone)]
pub struct PlatformReply {
    pub text: String,
    pub chunks: Vec<String>,
}

impl PlatformReply {
    pub fn single(text: impl Into<String>) -> Self {
        let text = text.into();
        Self { chunks: vec![text.clone()], text }
    }
}

/// Tunable policy knobs for one character service instance. Defaults mirror
/// the constants named throughout spec §4 and §5.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub character: String,
    /// User-visible chunk size cap for platforms with a message size limit.
    pub reply_chunk_size: usize,
    /// Global per-turn deadline (spec §5); on expiry a timeout reply is produced.
    pub global_turn_deadline: Duration,
    /// How many prior turns (from L3 history) are rendered as alternating
    /// prior-turn messages before L1's stage-B truncation runs.
    pub prior_turns_window: usize,
    /// How many retrieved memories / facts / preferences each contribute at most.
    pub retrieval_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            character: "unknown".to_string(),
            reply_chunk_size: 2_000,
            global_turn_deadline: Duration::from_secs(45),
            prior_turns_window: 10,
            retrieval_limit: 10,
        }
    }
}

/// One inbound message's processing outcome, for callers (tests, the
/// platform adapter) that want more than just the final reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A reply was produced from a full or partially degraded pipeline run.
    Replied,
    /// Input failed the safety filter; a polite rejection was returned.
    Rejected,
    /// The LLM call itself failed; a persona apology was returned.
    LlmFailed,
    /// The global per-turn deadline elapsed.
    TimedOut,
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}
