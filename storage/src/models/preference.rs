//! Preference model: a learned (user, key) -> value record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Preference {
    pub user_id: String,
    pub key: String,
    pub value: String,
    pub confidence: f64,
    pub last_seen: DateTime<Utc>,
}

impl Preference {
    pub fn new(user_id: impl Into<String>, key: impl Into<String>, value: impl Into<String>, confidence: f64) -> Self {
        Self {
            user_id: user_id.into(),
            key: key.into(),
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            last_seen: Utc::now(),
        }
    }
}
