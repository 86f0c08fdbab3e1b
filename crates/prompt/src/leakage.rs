//! Outbound leakage scanner: a last-resort net over the assembled reply,
//! catching the rare case where the model echoes back fragments of its own
//! system instructions instead of just answering in character.
//!
//! The teacher corpus never reaches for `regex` for text classification, so
//! this stays a manual substring scan over a short, explicit pattern list
//! rather than pulling in a new dependency for a handful of literal phrases.

pub const FILTERED_PLACEHOLDER: &str = "[SYSTEM_INFORMATION_FILTERED]";

/// Case-insensitive substrings that should never appear in a reply sent to a
/// user; any match is replaced wholesale with [`FILTERED_PLACEHOLDER`].
const FORBIDDEN_PATTERNS: &[&str] = &[
    "system prompt",
    "system instructions",
    "you are a helpful assistant",
    "as an ai language model",
    "token budget",
    "conversation boundary manager",
    "vector memory store",
    "knowledge store",
    "prompt assembler",
    "[system_information_filtered]",
];

/// Scans `text` for forbidden substrings and replaces each full match (by its
/// original casing span) with [`FILTERED_PLACEHOLDER`]. Returns the cleaned
/// text and whether any replacement occurred.
pub fn scan_and_filter(text: &str) -> (String, bool) {
    let lower = text.to_lowercase();
    let mut ranges: Vec<(usize, usize)> = Vec::new();

    for pattern in FORBIDDEN_PATTERNS {
        let mut search_from = 0usize;
        while let Some(pos) = lower[search_from..].find(pattern) {
            let start = search_from + pos;
            let end = start + pattern.len();
            ranges.push((start, end));
            search_from = end;
        }
    }

    ranges.extend(find_template_variable_leaks(text));
    ranges.extend(find_user_id_leaks(text));

    if ranges.is_empty() {
        return (text.to_string(), false);
    }

    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (start, end) in ranges {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for (start, end) in merged {
        out.push_str(&text[cursor..start]);
        out.push_str(FILTERED_PLACEHOLDER);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    (out, true)
}

/// Finds unrendered template placeholders like `{MEMORY_NETWORK_CONTEXT}` —
/// a brace-delimited span of uppercase letters/underscores only, the shape
/// every variable in [`crate::template::TEMPLATE_VARIABLES`] takes. A real
/// reply never contains literal braces around shouting-case text, so this
/// stays a cheap structural scan rather than a dictionary of variable names.
fn find_template_variable_leaks(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(close) = text[i + 1..].find('}') {
                let end = i + 1 + close;
                let inner = &text[i + 1..end];
                if !inner.is_empty()
                    && inner.len() <= 64
                    && inner.chars().all(|c| c.is_ascii_uppercase() || c == '_')
                {
                    ranges.push((i, end + 1));
                    i = end + 1;
                    continue;
                }
            }
        }
        i += 1;
    }
    ranges
}

/// Finds `user_id: <digits>` / `user_id=<digits>` style leaks of the raw
/// internal identifier, regardless of punctuation between key and value.
fn find_user_id_leaks(text: &str) -> Vec<(usize, usize)> {
    const KEY: &str = "user_id";
    let lower = text.to_lowercase();
    let mut ranges = Vec::new();
    let mut search_from = 0usize;
    while let Some(pos) = lower[search_from..].find(KEY) {
        let key_start = search_from + pos;
        let mut cursor = key_start + KEY.len();
        let rest = &text[cursor..];
        let skip = rest.chars().take_while(|c| c.is_whitespace() || *c == ':' || *c == '=').count();
        cursor += skip;
        let digits_len = text[cursor..].chars().take_while(|c| c.is_ascii_digit()).count();
        if digits_len > 0 {
            ranges.push((key_start, cursor + digits_len));
            search_from = cursor + digits_len;
        } else {
            search_from = key_start + KEY.len();
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_passes_through_unchanged() {
        let (out, filtered) = scan_and_filter("It was great catching up with you today!");
        assert!(!filtered);
        assert_eq!(out, "It was great catching up with you today!");
    }

    #[test]
    fn leaked_phrase_is_replaced_case_insensitively() {
        let (out, filtered) = scan_and_filter("Per my SYSTEM PROMPT, I should stay in character.");
        assert!(filtered);
        assert!(out.contains(FILTERED_PLACEHOLDER));
        assert!(!out.to_lowercase().contains("system prompt"));
    }

    #[test]
    fn overlapping_matches_are_merged_into_one_placeholder() {
        let (out, filtered) = scan_and_filter("my system prompt system instructions are secret");
        assert!(filtered);
        assert_eq!(out.matches(FILTERED_PLACEHOLDER).count(), 2);
    }

    #[test]
    fn unrendered_template_placeholder_is_filtered() {
        let (out, filtered) = scan_and_filter("Sure, here's what I recall: {MEMORY_NETWORK_CONTEXT} anyway, how are you?");
        assert!(filtered);
        assert!(!out.contains("{MEMORY_NETWORK_CONTEXT}"));
        assert!(out.contains(FILTERED_PLACEHOLDER));
    }

    #[test]
    fn raw_user_id_leak_is_filtered() {
        let (out, filtered) = scan_and_filter("Sure thing, user_id: 12345, I remember you!");
        assert!(filtered);
        assert!(!out.contains("12345"));
    }

    #[test]
    fn ordinary_braces_in_prose_are_left_alone() {
        let (out, filtered) = scan_and_filter("I felt like {so many things} happened today.");
        assert!(!filtered);
        assert_eq!(out, "I felt like {so many things} happened today.");
    }
}
