//! Token Accountant (L1): a coarse, deterministic token estimator and the
//! two-stage adaptive truncator consumed by the prompt assembler (L10).
//!
//! The `chars / 4` estimate is intentionally crude (spec §4.1, §9 open
//! question 4): it is never used for billing, only for local budgeting, so
//! no real tokenizer dependency is introduced.

use crate::chat_message::ChatMessage;

/// Characters taken to approximate one token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Hard ceiling on the combined size of all system messages.
pub const SYSTEM_PROMPT_MAX_TOKENS: usize = 16_000;
/// Hard ceiling on the combined size of the conversation (non-system) messages.
pub const CONVERSATION_HISTORY_MAX_TOKENS: usize = 8_000;
/// Policy-default total; the final LLM request may end up smaller.
pub const TOTAL_TOKEN_BUDGET: usize = 24_000;

/// Inserted into an emergency-truncated system message so downstream readers
/// (and tests) can recognize that truncation happened.
pub const TRUNCATION_MARKER: &str = "\n\n[...earlier system content truncated to fit the token budget...]";

/// Approximates the token count of `text` as `max(1, normalized_len / 4)`,
/// where `normalized_len` collapses runs of whitespace to a single space and
/// trims the ends first.
pub fn estimate(text: &str) -> usize {
    let normalized: String = {
        let mut out = String::with_capacity(text.len());
        let mut last_was_space = false;
        for ch in text.trim().chars() {
            if ch.is_whitespace() {
                if !last_was_space {
                    out.push(' ');
                }
                last_was_space = true;
            } else {
                out.push(ch);
                last_was_space = false;
            }
        }
        out
    };
    ((normalized.len()) / CHARS_PER_TOKEN).max(1)
}

fn estimate_message(msg: &ChatMessage) -> usize {
    estimate(&msg.content)
}

/// Character-truncates `text` from the tail to approximately `max_tokens`
/// tokens, appending [`TRUNCATION_MARKER`].
fn truncate_text_to_tokens(text: &str, max_tokens: usize) -> String {
    let max_chars = max_tokens.saturating_mul(CHARS_PER_TOKEN);
    if text.len() <= max_chars {
        return text.to_string();
    }
    let mut truncated = String::with_capacity(max_chars);
    for ch in text.chars() {
        if truncated.len() + ch.len_utf8() > max_chars {
            break;
        }
        truncated.push(ch);
    }
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Truncates `messages` to fit `max_conversation_tokens` while unconditionally
/// preserving all system messages (possibly emergency-truncating them first
/// if, alone, they exceed [`SYSTEM_PROMPT_MAX_TOKENS`]) and the newest
/// `min_recent_turns` conversation messages. Returns the surviving messages,
/// in original order, plus the number of tokens dropped.
///
/// Per spec §4.1: walk conversation messages newest to oldest, unconditionally
/// keeping the first `min_recent_turns`, then keep each older message only
/// while the running total stays within `max_conversation_tokens -
/// system_tokens`.
pub fn truncate(
    messages: Vec<ChatMessage>,
    max_conversation_tokens: usize,
    min_recent_turns: usize,
) -> (Vec<ChatMessage>, usize) {
    let mut system_messages: Vec<ChatMessage> = Vec::new();
    let mut conversation_messages: Vec<ChatMessage> = Vec::new();
    for msg in messages {
        if msg.is_system() {
            system_messages.push(msg);
        } else {
            conversation_messages.push(msg);
        }
    }

    let original_system_tokens: usize = system_messages.iter().map(estimate_message).sum();
    let mut removed_tokens = 0usize;

    let system_messages = if original_system_tokens > SYSTEM_PROMPT_MAX_TOKENS {
        // Emergency path: the final system message is character-truncated
        // from the tail with a marker; the others are dropped from the tail.
        let Some(last) = system_messages.pop() else {
            return (Vec::new(), 0);
        };
        removed_tokens += system_messages.iter().map(estimate_message).sum::<usize>();
        system_messages.clear();
        let truncated_content = truncate_text_to_tokens(&last.content, SYSTEM_PROMPT_MAX_TOKENS);
        removed_tokens += estimate(&last.content).saturating_sub(estimate(&truncated_content));
        vec![ChatMessage::system(truncated_content)]
    } else {
        system_messages
    };

    let system_tokens: usize = system_messages.iter().map(estimate_message).sum();
    let available_for_conversation = max_conversation_tokens.saturating_sub(system_tokens);

    // Walk newest-to-oldest.
    let mut kept_reversed: Vec<ChatMessage> = Vec::new();
    let mut running_total = 0usize;
    for (idx, msg) in conversation_messages.into_iter().rev().enumerate() {
        let tokens = estimate_message(&msg);
        if idx < min_recent_turns {
            running_total += tokens;
            kept_reversed.push(msg);
            continue;
        }
        if running_total + tokens <= available_for_conversation {
            running_total += tokens;
            kept_reversed.push(msg);
        } else {
            removed_tokens += tokens;
        }
    }
    kept_reversed.reverse();

    let mut out = system_messages;
    out.extend(kept_reversed);
    (out, removed_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_is_at_least_one_for_nonempty_text() {
        assert_eq!(estimate("hi"), 1);
        assert_eq!(estimate(""), 1);
    }

    #[test]
    fn estimate_collapses_whitespace() {
        let a = estimate("hello   world");
        let b = estimate("hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn keeps_min_recent_turns_when_budget_is_tiny() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("a".repeat(2000)),
            ChatMessage::assistant("b".repeat(2000)),
            ChatMessage::user("recent question"),
        ];
        let (kept, _removed) = truncate(messages, 10, 2);
        // system + last 2 conversation turns survive regardless of budget.
        assert!(kept.iter().any(|m| m.is_system()));
        let convo: Vec<&ChatMessage> = kept.iter().filter(|m| !m.is_system()).collect();
        assert_eq!(convo.len(), 2);
        assert_eq!(convo[1].content, "recent question");
    }

    #[test]
    fn drops_older_messages_oldest_first_once_over_budget() {
        let messages: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage::user(format!("turn {i} {}", "x".repeat(180 * CHARS_PER_TOKEN))))
            .collect();
        let (kept, removed) = truncate(messages, 2000, 2);
        assert!(kept.len() >= 2);
        assert!(removed > 0);
        // Survivors should be the newest ones (higher indices).
        let first_kept_content = &kept.first().unwrap().content;
        assert!(first_kept_content.contains("turn"));
    }

    #[test]
    fn a_single_exchange_always_survives() {
        let messages = vec![ChatMessage::user("hello"), ChatMessage::assistant("hi there")];
        let (kept, _) = truncate(messages, 0, 2);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn oversized_system_block_is_emergency_truncated_with_marker() {
        let huge_system = "s".repeat((SYSTEM_PROMPT_MAX_TOKENS + 5_000) * CHARS_PER_TOKEN);
        let messages = vec![ChatMessage::system(huge_system), ChatMessage::system("second system msg")];
        let (kept, _removed) = truncate(messages, 8_000, 2);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].is_system());
        assert!(kept[0].content.contains(TRUNCATION_MARKER));
    }
}
