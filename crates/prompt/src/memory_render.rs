//! Renders retrieved memories and facts into the "Retrieved memories" system
//! block (spec §4.10 step 5): split into global facts vs. user-specific
//! content, each entry labeled with a relative time and filtered to exclude
//! anything younger than two hours (that's already covered by the prior-turns
//! section, step 7).

use chrono::{DateTime, Duration, Utc};
use memory_core::MemoryRecord;
use storage::{Fact, Preference};

/// Sentinel `user_id` a [`Fact`] carries when it describes the character
/// itself rather than something learned about a specific user.
pub const GLOBAL_FACT_USER_ID: &str = "global";

/// A lowest-common-denominator item the retrieved-memories block can render,
/// regardless of whether it originated from L3 (a conversational turn) or L4
/// (a structured fact/preference).
#[derive(Debug, Clone)]
pub struct RenderableMemory {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_global: bool,
}

impl From<&MemoryRecord> for RenderableMemory {
    fn from(record: &MemoryRecord) -> Self {
        Self {
            content: record.content.clone(),
            timestamp: record.timestamp,
            is_global: false,
        }
    }
}

impl From<&Fact> for RenderableMemory {
    fn from(fact: &Fact) -> Self {
        Self {
            content: format!("{} {} {}", fact.entity_name, fact.relationship_type, fact.entity_type),
            timestamp: fact.updated_at,
            is_global: fact.user_id == GLOBAL_FACT_USER_ID,
        }
    }
}

impl From<&Preference> for RenderableMemory {
    fn from(pref: &Preference) -> Self {
        Self {
            content: format!("{}: {}", pref.key, pref.value),
            timestamp: pref.last_seen,
            is_global: false,
        }
    }
}

/// Minimum age for a memory to appear in the retrieved-memories block; more
/// recent turns are already present verbatim in the prior-turns section.
pub const MIN_MEMORY_AGE_FOR_RETRIEVAL: Duration = Duration::hours(2);

/// Renders a relative-time label ("3 hours ago", "2 days ago", "just now").
pub fn relative_time_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(timestamp);
    if age < Duration::minutes(1) {
        return "just now".to_string();
    }
    if age < Duration::hours(1) {
        let mins = age.num_minutes();
        return format!("{mins} minute{} ago", if mins == 1 { "" } else { "s" });
    }
    if age < Duration::days(1) {
        let hours = age.num_hours();
        return format!("{hours} hour{} ago", if hours == 1 { "" } else { "s" });
    }
    let days = age.num_days();
    format!("{days} day{} ago", if days == 1 { "" } else { "s" })
}

/// Filters `memories` to those old enough to retrieve, sorted newest first,
/// then renders the "Retrieved memories" system block text. Returns `None`
/// when nothing survives the age filter (the whole block is then omitted).
pub fn render_retrieved_memories_block(memories: &[RenderableMemory], now: DateTime<Utc>) -> Option<String> {
    let mut eligible: Vec<&RenderableMemory> = memories
        .iter()
        .filter(|m| now.signed_duration_since(m.timestamp) >= MIN_MEMORY_AGE_FOR_RETRIEVAL)
        .collect();
    if eligible.is_empty() {
        return None;
    }
    eligible.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let (global, user_specific): (Vec<&&RenderableMemory>, Vec<&&RenderableMemory>) =
        eligible.iter().partition(|m| m.is_global);

    let mut out = String::from("Retrieved memories:\n");
    if !global.is_empty() {
        out.push_str("Global facts:\n");
        for m in &global {
            out.push_str(&format!("- {} ({})\n", m.content, relative_time_label(m.timestamp, now)));
        }
    }
    if !user_specific.is_empty() {
        out.push_str("From this user:\n");
        for m in &user_specific {
            out.push_str(&format!("- {} ({})\n", m.content, relative_time_label(m.timestamp, now)));
        }
    }
    Some(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(content: &str, age: Duration, now: DateTime<Utc>, is_global: bool) -> RenderableMemory {
        RenderableMemory { content: content.to_string(), timestamp: now - age, is_global }
    }

    #[test]
    fn memories_younger_than_two_hours_are_excluded() {
        let now = Utc::now();
        let memories = vec![memory("too recent", Duration::minutes(30), now, false)];
        assert!(render_retrieved_memories_block(&memories, now).is_none());
    }

    #[test]
    fn eligible_memories_split_global_and_user_specific() {
        let now = Utc::now();
        let memories = vec![
            memory("likes hiking", Duration::hours(5), now, false),
            memory("is a marine biologist", Duration::days(2), now, true),
        ];
        let block = render_retrieved_memories_block(&memories, now).unwrap();
        assert!(block.contains("Global facts:"));
        assert!(block.contains("From this user:"));
        assert!(block.contains("is a marine biologist"));
        assert!(block.contains("2 days ago"));
    }

    #[test]
    fn relative_time_labels_scale_with_age() {
        let now = Utc::now();
        assert_eq!(relative_time_label(now, now), "just now");
        assert_eq!(relative_time_label(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time_label(now - Duration::days(1), now), "1 day ago");
    }
}
