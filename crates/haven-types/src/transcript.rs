//! Transcript buffer: the in-flight, not-yet-summarized message log for
//! one active counseling channel.
//!
//! The buffer lives in the shared store as a single JSON document keyed
//! by channel. It exists only between a `start` event and a successful
//! summarization dispatch (or explicit cleanup) and is append-only until
//! drained.

use serde::{Deserialize, Serialize};

use crate::channel::{ChannelId, ParticipantId};

/// One recorded message. `timestamp` is caller-supplied and opaque:
/// entry order is append order, not wall-clock order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

/// The per-channel transcript document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptBuffer {
    pub channel_id: ChannelId,
    pub user_id: ParticipantId,
    pub counselor_id: ParticipantId,
    pub messages: Vec<TranscriptEntry>,
}

impl TranscriptBuffer {
    /// An empty buffer for a freshly started conversation.
    pub fn empty(
        channel_id: ChannelId,
        user_id: ParticipantId,
        counselor_id: ParticipantId,
    ) -> Self {
        Self {
            channel_id,
            user_id,
            counselor_id,
            messages: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_document_round_trips() {
        let mut buffer = TranscriptBuffer::empty(42, 7, 1003);
        buffer.messages.push(TranscriptEntry {
            role: "ROLE_USER".to_string(),
            content: "I haven't been sleeping well.".to_string(),
            timestamp: "2025-04-01T10:00:00".to_string(),
        });

        let json = serde_json::to_string(&buffer).unwrap();
        let back: TranscriptBuffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, buffer);
    }

    #[test]
    fn empty_buffer_has_no_messages() {
        let buffer = TranscriptBuffer::empty(1, 2, 1000);
        assert!(buffer.messages.is_empty());
        assert_eq!(buffer.counselor_id, 1000);
    }
}
