//! Deterministic keyword/pattern fact and preference extraction (spec §4.11
//! step 8: "the extractor is deterministic keyword/pattern based; LLM
//! extraction is optional and gated" — this crate implements only the
//! deterministic half).

use storage::{Fact, Preference};

const NAME_PATTERNS: &[&str] = &["my name is ", "i'm called ", "call me "];
const LIKE_PATTERNS: &[(&str, &str)] = &[
    ("i love ", "loves"),
    ("i like ", "likes"),
    ("i enjoy ", "enjoys"),
    ("i really like ", "likes"),
];
const DISLIKE_PATTERNS: &[(&str, &str)] = &[("i hate ", "dislikes"), ("i don't like ", "dislikes")];
const LIVES_PATTERNS: &[&str] = &["i live in ", "i'm from ", "i am from "];

/// Extracts at most a handful of `(Fact)` rows from one turn's content.
/// Confidence is fixed per pattern kind rather than learned — the
/// deterministic extractor never claims more certainty than the surface
/// pattern warrants.
pub fn extract_facts(user_id: &str, content: &str) -> Vec<Fact> {
    let lower = content.to_lowercase();
    let mut facts = Vec::new();

    for pattern in NAME_PATTERNS {
        if let Some(pos) = lower.find(pattern) {
            let rest = &content[pos + pattern.len()..];
            if let Some(name) = first_clause(rest) {
                facts.push(Fact::new(user_id, name, "person", "has_name", 0.8));
            }
        }
    }

    for (pattern, relationship) in LIKE_PATTERNS {
        if let Some(pos) = lower.find(pattern) {
            let rest = &content[pos + pattern.len()..];
            if let Some(entity) = first_clause(rest) {
                facts.push(Fact::new(user_id, entity, "interest", *relationship, 0.6));
            }
        }
    }

    for (pattern, relationship) in DISLIKE_PATTERNS {
        if let Some(pos) = lower.find(pattern) {
            let rest = &content[pos + pattern.len()..];
            if let Some(entity) = first_clause(rest) {
                facts.push(Fact::new(user_id, entity, "interest", *relationship, 0.6));
            }
        }
    }

    for pattern in LIVES_PATTERNS {
        if let Some(pos) = lower.find(pattern) {
            let rest = &content[pos + pattern.len()..];
            if let Some(place) = first_clause(rest) {
                facts.push(Fact::new(user_id, place, "location", "lives_in", 0.7));
            }
        }
    }

    facts
}

/// Extracts simple `key: value` preference statements ("my favorite color is
/// blue") the deterministic extractor can confidently parse.
pub fn extract_preferences(user_id: &str, content: &str) -> Vec<Preference> {
    let lower = content.to_lowercase();
    let mut prefs = Vec::new();

    const FAVORITE_MARKERS: &[&str] = &["my favorite ", "my favourite "];
    for marker in FAVORITE_MARKERS {
        if let Some(pos) = lower.find(marker) {
            let rest = &content[pos + marker.len()..];
            if let Some((key, value)) = split_is(rest) {
                prefs.push(Preference::new(user_id, key.trim(), value.trim(), 0.6));
            }
        }
    }

    prefs
}

/// Takes the first comma/period/"and"-delimited clause and trims trailing
/// punctuation, giving a short noun phrase rather than the rest of the message.
fn first_clause(s: &str) -> Option<String> {
    let end = s
        .find(|c: char| c == '.' || c == ',' || c == '!' || c == '?' || c == ';' || c == '\n')
        .unwrap_or(s.len());
    let clause = s[..end].trim();
    let clause = clause
        .split(" and ")
        .next()
        .unwrap_or(clause)
        .trim();
    if clause.is_empty() || clause.chars().count() > 60 {
        None
    } else {
        Some(clause.to_string())
    }
}

/// Splits `"X is Y"` into `(key, value)` at the first standalone " is ".
fn split_is(s: &str) -> Option<(&str, &str)> {
    let pos = s.find(" is ")?;
    let key = &s[..pos];
    let value_start = pos + " is ".len();
    let end = s[value_start..]
        .find(|c: char| c == '.' || c == ',' || c == '!' || c == '?')
        .map(|i| value_start + i)
        .unwrap_or(s.len());
    Some((key, &s[value_start..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_fact() {
        let facts = extract_facts("u1", "Hi, my name is Alex and I'm new here.");
        assert!(facts.iter().any(|f| f.entity_name == "Alex" && f.relationship_type == "has_name"));
    }

    #[test]
    fn extracts_like_and_dislike() {
        let facts = extract_facts("u1", "I love hiking. I hate traffic.");
        assert!(facts.iter().any(|f| f.entity_name == "hiking" && f.relationship_type == "loves"));
        assert!(facts.iter().any(|f| f.entity_name == "traffic" && f.relationship_type == "dislikes"));
    }

    #[test]
    fn extracts_favorite_preference() {
        let prefs = extract_preferences("u1", "My favorite color is blue, always has been.");
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].key, "color");
        assert_eq!(prefs[0].value, "blue");
    }

    #[test]
    fn ordinary_message_yields_nothing() {
        assert!(extract_facts("u1", "What's the weather like today?").is_empty());
        assert!(extract_preferences("u1", "What's the weather like today?").is_empty());
    }
}
