//! Session, topic, and transition types (L5).

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bounded topic-history length kept per session.
pub const TOPIC_HISTORY_CAP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Active,
    Paused,
    Resumed,
    Interrupted,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicResolution {
    Active,
    Resolved,
    Interrupted,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    NewSession,
    ExplicitChange,
    Resumption,
    NaturalFlow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub keywords: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub message_count: u32,
    pub emotional_tone: Option<String>,
    pub resolution: TopicResolution,
}

impl Topic {
    pub fn new(keywords: Vec<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            keywords,
            start_time,
            end_time: None,
            message_count: 0,
            emotional_tone: None,
            resolution: TopicResolution::Active,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn duration_against(&self, now: DateTime<Utc>) -> chrono::Duration {
        let end = self.end_time.unwrap_or(now);
        end - self.start_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: Uuid,
    pub user_id: String,
    pub channel_id: String,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub state: SessionState,
    pub message_count: u32,
    pub current_topic: Option<Topic>,
    pub topic_history: VecDeque<Topic>,
    pub summary: String,
}

impl ConversationSession {
    pub fn new(user_id: impl Into<String>, channel_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            channel_id: channel_id.into(),
            start_time: now,
            last_activity: now,
            state: SessionState::Active,
            message_count: 0,
            current_topic: None,
            topic_history: VecDeque::with_capacity(TOPIC_HISTORY_CAP),
            summary: String::new(),
        }
    }

    /// Closes the current open topic (if any) and pushes it onto the bounded
    /// history, evicting the oldest entry past [`TOPIC_HISTORY_CAP`].
    pub fn close_current_topic(&mut self, end_time: DateTime<Utc>, resolution: TopicResolution) {
        if let Some(mut topic) = self.current_topic.take() {
            topic.end_time = Some(end_time);
            topic.resolution = resolution;
            if self.topic_history.len() >= TOPIC_HISTORY_CAP {
                self.topic_history.pop_front();
            }
            self.topic_history.push_back(topic);
        }
    }
}

/// Read-only rendering of a topic for prompt assembly / context views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicView {
    pub keywords: Vec<String>,
    pub duration_secs: i64,
    pub emotional_tone: Option<String>,
    pub message_count: u32,
}

impl From<&Topic> for TopicView {
    fn from(t: &Topic) -> Self {
        let duration_secs = t
            .end_time
            .map(|end| (end - t.start_time).num_seconds())
            .unwrap_or(0);
        Self {
            keywords: t.keywords.clone(),
            duration_secs,
            emotional_tone: t.emotional_tone.clone(),
            message_count: t.message_count,
        }
    }
}

/// Runtime-only snapshot L10 consumes to assemble the relevant prompt sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextView {
    pub session_state: SessionState,
    pub current_topic: Option<TopicView>,
    pub topic_history: Vec<TopicView>,
    pub summary: Option<String>,
    /// Resumption bridge sentence, present only immediately after a `resumed` transition.
    pub bridge: Option<String>,
    /// Total messages seen in this session; a coarse proxy for relationship
    /// depth (L10 uses this for the one-line relationship summary).
    pub total_messages: u32,
}
