//! External emotion analysis API client interface (§6). Optional and
//! non-fatal on failure: the orchestrator treats an `Err` exactly like a
//! timeout, as a null bundle slot.

use crate::types::ExternalEmotionResult;
use async_trait::async_trait;

#[async_trait]
pub trait ExternalEmotionClient: Send + Sync {
    async fn analyze(&self, user_id: &str, text: &str, recent_history: &[String]) -> anyhow::Result<ExternalEmotionResult>;
}
