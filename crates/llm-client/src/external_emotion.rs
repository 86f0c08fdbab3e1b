//! HTTP implementation of `orchestrator::ExternalEmotionClient` (spec §6):
//! posts the text plus a short recent-history window and parses the
//! `{primary_emotion, confidence, intensity, tier_used?, analysis_time_ms?,
//! api_calls_made?}` response shape. Any transport or parse failure is
//! returned as `Err` and treated upstream exactly like a timeout: the
//! orchestrator leaves the bundle's emotion slot null rather than failing
//! the turn.

use async_trait::async_trait;
use orchestrator::{ExternalEmotionClient, ExternalEmotionResult};
use serde::{Deserialize, Serialize};

use crate::config::OptionalEndpointConfig;

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    user_id: &'a str,
    text: &'a str,
    recent_history: &'a [String],
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    primary_emotion: String,
    confidence: f32,
    intensity: f32,
    tier_used: Option<String>,
    analysis_time_ms: Option<u64>,
    api_calls_made: Option<u32>,
}

pub struct HttpExternalEmotionClient {
    http: reqwest::Client,
    config: OptionalEndpointConfig,
}

impl HttpExternalEmotionClient {
    pub fn new(config: OptionalEndpointConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }
}

#[async_trait]
impl ExternalEmotionClient for HttpExternalEmotionClient {
    async fn analyze(&self, user_id: &str, text: &str, recent_history: &[String]) -> anyhow::Result<ExternalEmotionResult> {
        let mut request = self.http.post(&self.config.base_url).json(&AnalyzeRequest { user_id, text, recent_history });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?.error_for_status()?;
        let parsed: AnalyzeResponse = response.json().await?;
        Ok(ExternalEmotionResult {
            primary_emotion: parsed.primary_emotion,
            confidence: parsed.confidence.clamp(0.0, 1.0),
            intensity: parsed.intensity.clamp(0.0, 1.0),
            tier_used: parsed.tier_used,
            analysis_time_ms: parsed.analysis_time_ms,
            api_calls_made: parsed.api_calls_made,
        })
    }
}
