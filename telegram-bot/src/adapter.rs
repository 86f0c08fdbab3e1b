//! Converts teloxide wire types to/from the pipeline's platform-neutral
//! [`PlatformMessage`]/[`PlatformReply`] (spec §6). Mirrors the teacher's
//! `TelegramMessageWrapper` conversion, narrowed to the fields the pipeline
//! actually consumes.

use pipeline::{Attachment, PlatformMessage, PlatformReply};
use teloxide::types::Message as TeloxideMessage;

/// Converts an inbound Telegram message into a [`PlatformMessage`]. Returns
/// `None` for messages with no text body (photos, stickers, etc.) — the
/// pipeline has nothing to process for those.
pub fn to_platform_message(msg: &TeloxideMessage) -> Option<PlatformMessage> {
    let content = msg.text().or_else(|| msg.caption())?.to_string();
    let user_id = msg.from.as_ref().map(|u| u.id.0.to_string()).unwrap_or_else(|| "0".to_string());

    Some(PlatformMessage {
        platform: "telegram".to_string(),
        user_id,
        channel_id: msg.chat.id.0.to_string(),
        message_id: msg.id.to_string(),
        content,
        attachments: Vec::<Attachment>::new(),
        timestamp: msg.date,
    })
}

/// Splits a [`PlatformReply`] into the sequence of texts a caller should
/// send, in order. `chunks` is always non-empty for a populated reply.
pub fn reply_segments(reply: &PlatformReply) -> &[String] {
    &reply.chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_segments_returns_the_chunk_list() {
        let reply = PlatformReply { text: "a b".to_string(), chunks: vec!["a".to_string(), "b".to_string()] };
        assert_eq!(reply_segments(&reply), &["a".to_string(), "b".to_string()]);
    }
}
