//! Fact model: a learned (user, entity, relationship) triple.
//!
//! Upsert semantics live in [`crate::knowledge_store::KnowledgeStore`]: the
//! tuple `(user_id, entity_name, relationship_type)` is unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Fact {
    pub user_id: String,
    pub entity_name: String,
    pub entity_type: String,
    pub relationship_type: String,
    pub confidence: f64,
    pub emotional_context: Option<String>,
    pub attributed_character: Option<String>,
    pub source_conversation: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Fact {
    pub fn new(
        user_id: impl Into<String>,
        entity_name: impl Into<String>,
        entity_type: impl Into<String>,
        relationship_type: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            entity_name: entity_name.into(),
            entity_type: entity_type.into(),
            relationship_type: relationship_type.into(),
            confidence: confidence.clamp(0.0, 1.0),
            emotional_context: None,
            attributed_character: None,
            source_conversation: None,
            updated_at: Utc::now(),
        }
    }
}
