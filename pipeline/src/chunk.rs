//! User-visible chunking (spec §4.11 step 7): platforms with a message size
//! cap receive the reply pre-split near `max_len`, breaking between words
//! rather than mid-word wherever possible.

/// Splits `text` into chunks no longer than `max_len` characters. Built by
/// packing whitespace-separated words greedily into each chunk; a single
/// word longer than `max_len` on its own is hard-cut at the character
/// boundary rather than growing the chunk unbounded.
pub fn chunk_reply(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 || text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if word.chars().count() > max_len {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_len) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let extra = if current.is_empty() { word.chars().count() } else { word.chars().count() + 1 };
        if current.chars().count() + extra > max_len && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_reply("hello there", 2_000);
        assert_eq!(chunks, vec!["hello there".to_string()]);
    }

    #[test]
    fn long_text_splits_on_whitespace_boundaries() {
        let text = "lorem ".repeat(1000);
        let chunks = chunk_reply(&text, 2_000);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 2_000);
        }
        assert_eq!(chunks.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn unbroken_long_word_is_hard_cut() {
        let text = "a".repeat(5_000);
        let chunks = chunk_reply(&text, 2_000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 2_000);
    }
}
