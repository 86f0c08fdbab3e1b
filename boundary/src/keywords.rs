//! Topic-keyword extraction, transition-marker detection, and relative-time
//! phrasing, carried over verbatim (in spirit) from the Python original's
//! `_extract_topic_keywords` / `_generate_resumption_bridge`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

const STOPWORDS: &[&str] = &[
    "the", "and", "that", "have", "for", "not", "with", "you", "this", "but", "his", "from",
    "they", "she", "will", "would", "there", "their", "what", "about", "which", "when", "make",
    "like", "time", "just", "know", "take", "into", "your", "some", "could", "them", "other",
    "than", "then", "only", "come", "over", "think", "also", "back", "after", "work", "first",
    "well", "even", "want", "because", "these", "give", "most",
];

const EXPLICIT_CHANGE_MARKERS: &[&str] = &[
    "anyway",
    "by the way",
    "new topic",
    "speaking of",
    "on another note",
    "changing the subject",
    "unrelated",
];

const RESUMPTION_MARKERS: &[&str] = &[
    "back to",
    "as i was saying",
    "returning to",
    "where were we",
    "continuing from",
    "picking up",
];

const COMPLETION_MARKERS: &[&str] = &["thanks", "thank you", "got it", "that helps", "makes sense"];

pub fn matches_any(text_lower: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text_lower.contains(p))
}

pub fn is_explicit_change(text_lower: &str) -> bool {
    matches_any(text_lower, EXPLICIT_CHANGE_MARKERS)
}

pub fn is_resumption(text_lower: &str) -> bool {
    matches_any(text_lower, RESUMPTION_MARKERS)
}

pub fn is_completion(text_lower: &str) -> bool {
    matches_any(text_lower, COMPLETION_MARKERS)
}

/// Top-10 content words by frequency, excluding stopwords and tokens of
/// length ≤ 3. Ties keep first-seen order.
pub fn extract_topic_keywords(content: &str) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for raw in content.split(|c: char| !c.is_alphanumeric()) {
        let word = raw.to_lowercase();
        if word.len() <= 3 || STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        if !counts.contains_key(&word) {
            order.push(word.clone());
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = order.into_iter().map(|w| (w.clone(), counts[&w])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(10).map(|(w, _)| w).collect()
}

/// `"20 minutes ago"` / `"2.3 hours ago"` / `"1.2 days ago"`, tiered exactly
/// as the original's resumption-bridge relative-time formatting.
pub fn relative_time(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let minutes = (to - from).num_seconds() as f64 / 60.0;
    if minutes < 60.0 {
        format!("{} minutes ago", minutes.round() as i64)
    } else if minutes < 1440.0 {
        format!("{:.1} hours ago", minutes / 60.0)
    } else {
        format!("{:.1} days ago", minutes / 1440.0)
    }
}

/// `"Welcome back! We were discussing {keywords} about {relative_time}."`
pub fn resumption_bridge(keywords: &[String], from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let kw = if keywords.is_empty() {
        "earlier topics".to_string()
    } else {
        keywords.join(", ")
    };
    format!(
        "Welcome back! We were discussing {} about {}.",
        kw,
        relative_time(from, to)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_top_keywords_excluding_stopwords_and_short_words() {
        let kws = extract_topic_keywords(
            "coral reefs coral reefs ocean acidification research reefs the and",
        );
        assert!(kws.contains(&"coral".to_string()));
        assert!(kws.contains(&"reefs".to_string()));
        assert!(!kws.contains(&"the".to_string()));
    }

    #[test]
    fn relative_time_tiers() {
        let t0 = Utc::now();
        assert!(relative_time(t0, t0 + chrono::Duration::minutes(20)).contains("minutes"));
        assert!(relative_time(t0, t0 + chrono::Duration::hours(3)).contains("hours"));
        assert!(relative_time(t0, t0 + chrono::Duration::days(2)).contains("days"));
    }
}
