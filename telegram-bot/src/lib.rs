//! Telegram platform adapter and service entrypoint (spec §6).
//!
//! Wires `dbot-core`'s tracing init, `pipeline`'s `PipelineController`, and a
//! teloxide-based Telegram connection. This is the only crate in the
//! workspace that talks to a real chat platform.

pub mod adapter;
pub mod config;

pub use adapter::{reply_segments, to_platform_message};
pub use config::BotConfig;
