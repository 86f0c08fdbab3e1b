//! [`BoundaryManager`]: the L5 session/topic state machine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::keywords::{
    extract_topic_keywords, is_completion, is_explicit_change, is_resumption, resumption_bridge,
};
use crate::types::{ContextView, ConversationSession, SessionState, TopicResolution, TopicView, TransitionKind};

/// Idle gap after which an active session is paused.
pub const DEFAULT_KEEPALIVE_TIMEOUT: StdDuration = StdDuration::from_secs(15 * 60);
/// Absolute session lifetime before it is paused regardless of activity.
pub const DEFAULT_ABSOLUTE_TIMEOUT: StdDuration = StdDuration::from_secs(90 * 60);
/// Message count at which the session summary is regenerated.
pub const DEFAULT_SUMMARIZATION_THRESHOLD: u32 = 50;
/// Max number of live sessions kept in memory before the coarse eviction pass runs.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Optional LLM-backed summarizer. Failures fall back to a deterministic
/// summary string; this is not surfaced as an error to callers.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, topics: &[TopicView]) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct BoundaryConfig {
    pub keepalive_timeout: StdDuration,
    pub absolute_timeout: StdDuration,
    pub summarization_threshold: u32,
    pub max_sessions: usize,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            keepalive_timeout: DEFAULT_KEEPALIVE_TIMEOUT,
            absolute_timeout: DEFAULT_ABSOLUTE_TIMEOUT,
            summarization_threshold: DEFAULT_SUMMARIZATION_THRESHOLD,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    user_id: String,
    channel_id: String,
}

/// Per-(user, channel) session map with a lock per key, so that messages for
/// one channel are processed FIFO while distinct channels proceed
/// concurrently. Process-local; durable conversation history lives in L3.
pub struct BoundaryManager {
    sessions: RwLock<HashMap<SessionKey, Arc<Mutex<ConversationSession>>>>,
    config: BoundaryConfig,
    summarizer: Option<Arc<dyn Summarizer>>,
}

/// Outcome of one `process_message` call: the session as it stands after the
/// update, the transition kind detected, and (when the transition was a
/// resumption) a bridge sentence for the prompt assembler.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub session: ConversationSession,
    pub transition: TransitionKind,
    pub bridge: Option<String>,
}

impl BoundaryManager {
    pub fn new(config: BoundaryConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            summarizer: None,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    async fn session_lock(&self, user_id: &str, channel_id: &str) -> Arc<Mutex<ConversationSession>> {
        let key = SessionKey {
            user_id: user_id.to_string(),
            channel_id: channel_id.to_string(),
        };
        {
            let sessions = self.sessions.read().await;
            if let Some(lock) = sessions.get(&key) {
                return Arc::clone(lock);
            }
        }
        let mut sessions = self.sessions.write().await;
        if let Some(lock) = sessions.get(&key) {
            return Arc::clone(lock);
        }
        if sessions.len() >= self.config.max_sessions {
            evict_oldest(&mut sessions);
        }
        let lock = Arc::new(Mutex::new(ConversationSession::new(user_id, channel_id, Utc::now())));
        sessions.insert(key, Arc::clone(&lock));
        lock
    }

    /// Drives the L5 state machine for one inbound message; see spec §4.5.
    pub async fn process_message(
        &self,
        user_id: &str,
        channel_id: &str,
        content: &str,
        ts: DateTime<Utc>,
    ) -> ProcessResult {
        let lock = self.session_lock(user_id, channel_id).await;
        let mut session = lock.lock().await;

        let is_new = session.message_count == 0 && session.current_topic.is_none();
        let mut bridge = None;
        let mut just_resumed = false;
        let pre_pause_last_activity = session.last_activity;
        let pre_pause_topic_keywords = session.current_topic.as_ref().map(|t| t.keywords.clone());

        if !is_new {
            let idle = (ts - session.last_activity).to_std().unwrap_or_default();
            let age = (ts - session.start_time).to_std().unwrap_or_default();
            if session.state != SessionState::Paused {
                if idle > self.config.keepalive_timeout || age > self.config.absolute_timeout {
                    session.state = SessionState::Paused;
                }
            }
            if session.state == SessionState::Paused {
                session.state = SessionState::Resumed;
                just_resumed = true;
            }
        }

        session.last_activity = ts;
        session.message_count += 1;
        if session.state != SessionState::Resumed {
            session.state = SessionState::Active;
        }

        let content_lower = content.to_lowercase();
        let transition = if is_new {
            TransitionKind::NewSession
        } else if just_resumed || is_resumption(&content_lower) {
            TransitionKind::Resumption
        } else if is_explicit_change(&content_lower) {
            TransitionKind::ExplicitChange
        } else {
            // Completion markers end the topic but not the session — natural flow.
            TransitionKind::NaturalFlow
        };

        match transition {
            TransitionKind::NaturalFlow if is_completion(&content_lower) && session.current_topic.is_some() => {
                session.close_current_topic(ts, TopicResolution::Resolved);
            }
            TransitionKind::NaturalFlow => {
                if let Some(topic) = session.current_topic.as_mut() {
                    topic.message_count += 1;
                } else {
                    let keywords = extract_topic_keywords(content);
                    session.current_topic = Some(crate::types::Topic::new(keywords, ts));
                }
            }
            TransitionKind::NewSession => {
                let keywords = extract_topic_keywords(content);
                session.current_topic = Some(crate::types::Topic::new(keywords, ts));
            }
            TransitionKind::ExplicitChange => {
                session.close_current_topic(ts, TopicResolution::Ended);
                let keywords = extract_topic_keywords(content);
                session.current_topic = Some(crate::types::Topic::new(keywords, ts));
            }
            TransitionKind::Resumption => {
                if just_resumed {
                    let prev_keywords = pre_pause_topic_keywords.unwrap_or_default();
                    bridge = Some(resumption_bridge(&prev_keywords, pre_pause_last_activity, ts));
                }
                session.close_current_topic(ts, TopicResolution::Interrupted);
                let keywords = extract_topic_keywords(content);
                session.current_topic = Some(crate::types::Topic::new(keywords, ts));
            }
        }

        if session.message_count >= self.config.summarization_threshold {
            self.regenerate_summary(&mut session).await;
        }

        ProcessResult {
            session: session.clone(),
            transition,
            bridge,
        }
    }

    async fn regenerate_summary(&self, session: &mut ConversationSession) {
        let recent_topics: Vec<TopicView> = session
            .topic_history
            .iter()
            .rev()
            .take(3)
            .map(TopicView::from)
            .collect();

        if let Some(summarizer) = &self.summarizer {
            match summarizer.summarize(&recent_topics).await {
                Ok(summary) => {
                    session.summary = summary;
                    return;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "LLM summarization failed, falling back to deterministic summary");
                }
            }
        }
        session.summary = deterministic_summary(&recent_topics);
    }

    /// Read-only view for the prompt assembler (L10).
    pub async fn get_conversation_context(
        &self,
        user_id: &str,
        channel_id: &str,
        include_summary: bool,
    ) -> Option<ContextView> {
        let key = SessionKey {
            user_id: user_id.to_string(),
            channel_id: channel_id.to_string(),
        };
        let lock = {
            let sessions = self.sessions.read().await;
            sessions.get(&key).cloned()?
        };
        let session = lock.lock().await;
        Some(ContextView {
            session_state: session.state,
            current_topic: session.current_topic.as_ref().map(TopicView::from),
            topic_history: session.topic_history.iter().rev().take(5).map(TopicView::from).collect(),
            summary: if include_summary && !session.summary.is_empty() {
                Some(session.summary.clone())
            } else {
                None
            },
            bridge: None,
            total_messages: session.message_count,
        })
    }
}

fn deterministic_summary(topics: &[TopicView]) -> String {
    if topics.is_empty() {
        return "No topics recorded yet.".to_string();
    }
    let total_minutes: i64 = topics.iter().map(|t| t.duration_secs / 60).sum();
    let names: Vec<String> = topics
        .iter()
        .map(|t| {
            if t.keywords.is_empty() {
                "general".to_string()
            } else {
                t.keywords.join("/")
            }
        })
        .collect();
    format!(
        "{} topics over {} minutes, topics: {}",
        topics.len(),
        total_minutes,
        names.join("; ")
    )
}

/// Coarse O(n) eviction of the least-recently-active session. Bounded by
/// `max_sessions`; acceptable given the cap is in the thousands, not millions.
fn evict_oldest(sessions: &mut HashMap<SessionKey, Arc<Mutex<ConversationSession>>>) {
    let oldest_key = sessions
        .iter()
        .filter_map(|(k, v)| v.try_lock().ok().map(|s| (k.clone(), s.last_activity)))
        .min_by_key(|(_, last_activity)| *last_activity)
        .map(|(k, _)| k);
    if let Some(key) = oldest_key {
        sessions.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_turn_creates_active_session_with_no_transitions_beyond_new_session() {
        let mgr = BoundaryManager::new(BoundaryConfig::default());
        let result = mgr.process_message("u1", "c1", "Hello there", Utc::now()).await;
        assert_eq!(result.transition, TransitionKind::NewSession);
        assert_eq!(result.session.message_count, 1);
        assert!(result.session.current_topic.is_some());
    }

    #[tokio::test]
    async fn resumption_after_keepalive_timeout_produces_bridge() {
        let mgr = BoundaryManager::new(BoundaryConfig {
            keepalive_timeout: StdDuration::from_secs(15 * 60),
            ..BoundaryConfig::default()
        });
        let t0 = Utc::now();
        mgr.process_message("u1", "c1", "Hey", t0).await;
        let t1 = t0 + chrono::Duration::minutes(20);
        let result = mgr
            .process_message("u1", "c1", "back to what we were discussing about reefs", t1)
            .await;

        assert_eq!(result.session.state, SessionState::Resumed);
        assert_eq!(result.transition, TransitionKind::Resumption);
        assert!(result.bridge.is_some());
        assert!(result.bridge.unwrap().contains("ago"));
    }

    #[tokio::test]
    async fn explicit_change_marker_ends_topic_and_starts_new_one() {
        let mgr = BoundaryManager::new(BoundaryConfig::default());
        mgr.process_message("u1", "c1", "I love coral reefs and marine biology", Utc::now())
            .await;
        let result = mgr
            .process_message(
                "u1",
                "c1",
                "by the way, what's a good Italian restaurant in Seattle?",
                Utc::now(),
            )
            .await;
        assert_eq!(result.transition, TransitionKind::ExplicitChange);
        assert_eq!(result.session.topic_history.len(), 1);
    }

    #[tokio::test]
    async fn per_key_lock_serializes_concurrent_updates() {
        let mgr = Arc::new(BoundaryManager::new(BoundaryConfig::default()));
        let mut handles = Vec::new();
        for i in 0..20 {
            let mgr = Arc::clone(&mgr);
            handles.push(tokio::spawn(async move {
                mgr.process_message("u1", "c1", &format!("message {i}"), Utc::now()).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        // The first processed message opens the topic (count 0); each of the
        // remaining 19 natural-flow messages increments it by one.
        let ctx = mgr.get_conversation_context("u1", "c1", false).await.unwrap();
        assert_eq!(ctx.current_topic.unwrap().message_count, 19);
    }
}
