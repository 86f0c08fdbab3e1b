//! Pipeline Controller (L11).
//!
//! The top-level crate a platform adapter binary (e.g. `telegram-bot`)
//! depends on: it owns one [`PipelineController`] per character service
//! instance and drives every other layer (L1-L10) through it for each
//! inbound [`PlatformMessage`].

mod chunk;
mod controller;
mod fact_extraction;
mod safety;
mod types;

pub use chunk::chunk_reply;
pub use controller::PipelineController;
pub use safety::{is_unsafe_input, REJECTION_REPLY};
pub use types::{Attachment, PipelineConfig, PlatformMessage, PlatformReply, TurnOutcome};
