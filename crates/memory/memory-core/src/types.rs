//! Core types shared by the vector memory store (L3) and its query strategies.
//!
//! ## MemoryRole
//!
//! Role of the speaker that produced a [`MemoryRecord`].
//!
//! ## MemoryRecord
//!
//! One immutable turn stored in a character's collection, carrying up to
//! three named embeddings (`content`, `emotion`, `semantic`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of the speaker that produced a memory record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MemoryRole {
    User,
    Assistant,
}

/// One of the named vectors a memory record may carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VectorName {
    Content,
    Emotion,
    Semantic,
}

impl VectorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorName::Content => "content",
            VectorName::Emotion => "emotion",
            VectorName::Semantic => "semantic",
        }
    }
}

/// An immutable turn stored in a character's vector collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub user_id: String,
    pub role: MemoryRole,
    pub content: String,
    pub embeddings: HashMap<VectorName, Vec<f32>>,
    pub timestamp: DateTime<Utc>,
    pub emotional_context: Option<String>,
    pub importance: f32,
    pub topics: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl MemoryRecord {
    pub fn new(user_id: impl Into<String>, role: MemoryRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            role,
            content: content.into(),
            embeddings: HashMap::new(),
            timestamp: Utc::now(),
            emotional_context: None,
            importance: 0.5,
            topics: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_embedding(mut self, name: VectorName, embedding: Vec<f32>) -> Self {
        self.embeddings.insert(name, embedding);
        self
    }
}

/// A prior record whose content diverges from the current conversational context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contradiction {
    pub record_id: Uuid,
    pub similarity: f32,
}

/// Lowercases, strips `bot_`/`_bot` affixes, collapses whitespace and
/// non-`[a-z0-9_-]` characters to `_`, and falls back to `"unknown"`.
///
/// Mirrors the normalization rule used throughout the original Python
/// implementation's `bot_name_utils.normalize_bot_name`.
pub fn normalize_character_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return "unknown".to_string();
    }

    let mut s = lower.as_str();
    if let Some(rest) = s.strip_prefix("bot_") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("_bot") {
        s = rest;
    }

    let mut collapsed = String::with_capacity(s.len());
    let mut last_was_sep = false;
    for ch in s.chars() {
        let mapped = if ch.is_whitespace() {
            Some('_')
        } else if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            Some(ch)
        } else {
            None
        };
        match mapped {
            Some(c) if c == '_' || c == '-' => {
                if !last_was_sep {
                    collapsed.push('_');
                }
                last_was_sep = true;
            }
            Some(c) => {
                collapsed.push(c);
                last_was_sep = false;
            }
            None => {
                // dropped character; does not start a separator run
            }
        }
    }

    let trimmed = collapsed.trim_matches(|c| c == '_' || c == '-');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Collection name for a character's vector store, per spec §4.3.
pub fn collection_name_for_character(character: &str) -> String {
    format!("whisperengine_memory_{}", normalize_character_name(character))
}

/// Inverse of [`collection_name_for_character`]; also strips the legacy `_7d` suffix.
pub fn extract_character_from_collection(collection_name: &str) -> String {
    let stripped = collection_name
        .strip_prefix("whisperengine_memory_")
        .unwrap_or(collection_name);
    stripped.strip_suffix("_7d").unwrap_or(stripped).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_affixes_and_whitespace() {
        assert_eq!(normalize_character_name("Bot_Elena Rodriguez"), "elena_rodriguez");
        assert_eq!(normalize_character_name("Marcus_bot"), "marcus");
        assert_eq!(normalize_character_name(""), "unknown");
        assert_eq!(normalize_character_name("!!!"), "unknown");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_character_name("Bot_Elena Rodriguez!!");
        let twice = normalize_character_name(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn collection_name_round_trips() {
        let name = collection_name_for_character("Elena Rodriguez");
        assert_eq!(name, "whisperengine_memory_elena_rodriguez");
        assert_eq!(extract_character_from_collection(&name), "elena_rodriguez");
        assert_eq!(
            extract_character_from_collection("whisperengine_memory_elena_7d"),
            "elena"
        );
    }
}
