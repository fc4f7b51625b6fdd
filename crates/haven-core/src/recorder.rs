//! Transcript recorder: init/append/fetch/clear over the shared store.
//!
//! The recorder owns the buffer lifecycle between a `start` event and the
//! summarization dispatch. It never fails the signaling path: appending
//! to a missing buffer drops the message with a warning, and initializing
//! a channel whose participants cannot be classified skips buffer
//! creation with a warning.

use std::sync::Arc;

use tracing::{debug, warn};

use haven_types::channel::{is_counselor_id, ChannelId};
use haven_types::error::StoreError;
use haven_types::transcript::{TranscriptBuffer, TranscriptEntry};

use crate::store::{MembershipStore, TranscriptStore};

/// Per-channel transcript buffer service.
pub struct TranscriptRecorder<M, T> {
    membership: Arc<M>,
    transcripts: Arc<T>,
}

impl<M: MembershipStore, T: TranscriptStore> TranscriptRecorder<M, T> {
    pub fn new(membership: Arc<M>, transcripts: Arc<T>) -> Self {
        Self {
            membership,
            transcripts,
        }
    }

    /// Start a fresh buffer for the channel, overwriting any prior one.
    ///
    /// The user and counselor identities are classified from the current
    /// member set by the id-space threshold. Returns `false` (without
    /// writing) when either side is missing from the channel.
    pub async fn initialize(&self, channel_id: ChannelId) -> Result<bool, StoreError> {
        let members = self.membership.members(channel_id).await?;

        let user_id = members.iter().copied().find(|id| !is_counselor_id(*id));
        let counselor_id = members.iter().copied().find(|id| is_counselor_id(*id));

        let (Some(user_id), Some(counselor_id)) = (user_id, counselor_id) else {
            warn!(
                channel_id,
                member_count = members.len(),
                "cannot initialize transcript: channel lacks a user or counselor"
            );
            return Ok(false);
        };

        self.transcripts
            .write(&TranscriptBuffer::empty(channel_id, user_id, counselor_id))
            .await?;
        debug!(channel_id, user_id, counselor_id, "transcript initialized");
        Ok(true)
    }

    /// Append one message in call order. A missing buffer means the
    /// message is dropped (with a warning), not queued.
    pub async fn append(
        &self,
        channel_id: ChannelId,
        role: &str,
        content: &str,
        timestamp: &str,
    ) -> Result<bool, StoreError> {
        let Some(mut buffer) = self.transcripts.read(channel_id).await? else {
            warn!(channel_id, "no transcript buffer; dropping message");
            return Ok(false);
        };

        buffer.messages.push(TranscriptEntry {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: timestamp.to_string(),
        });
        self.transcripts.write(&buffer).await?;
        debug!(channel_id, role, "message appended to transcript");
        Ok(true)
    }

    /// The full buffer, or `None` when no conversation is in flight.
    pub async fn fetch(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<TranscriptBuffer>, StoreError> {
        self.transcripts.read(channel_id).await
    }

    /// Delete the buffer. Idempotent.
    pub async fn clear(&self, channel_id: ChannelId) -> Result<(), StoreError> {
        self.transcripts.clear(channel_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryMembership, MemoryTranscripts};

    fn recorder() -> (
        Arc<MemoryMembership>,
        TranscriptRecorder<MemoryMembership, MemoryTranscripts>,
    ) {
        let membership = Arc::new(MemoryMembership::default());
        let transcripts = Arc::new(MemoryTranscripts::default());
        let recorder = TranscriptRecorder::new(membership.clone(), transcripts);
        (membership, recorder)
    }

    #[tokio::test]
    async fn initialize_classifies_user_and_counselor() {
        let (membership, recorder) = recorder();
        membership.join(42, 7).await.unwrap();
        membership.join(42, 1003).await.unwrap();

        assert!(recorder.initialize(42).await.unwrap());

        let buffer = recorder.fetch(42).await.unwrap().unwrap();
        assert_eq!(buffer.user_id, 7);
        assert_eq!(buffer.counselor_id, 1003);
        assert!(buffer.messages.is_empty());
    }

    #[tokio::test]
    async fn initialize_without_counselor_skips() {
        let (membership, recorder) = recorder();
        membership.join(42, 7).await.unwrap();

        assert!(!recorder.initialize(42).await.unwrap());
        assert!(recorder.fetch(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn initialize_overwrites_prior_buffer() {
        let (membership, recorder) = recorder();
        membership.join(42, 7).await.unwrap();
        membership.join(42, 1003).await.unwrap();

        recorder.initialize(42).await.unwrap();
        recorder
            .append(42, "ROLE_USER", "stale", "2025-04-01T09:00:00")
            .await
            .unwrap();
        recorder.initialize(42).await.unwrap();

        let buffer = recorder.fetch(42).await.unwrap().unwrap();
        assert!(buffer.messages.is_empty());
    }

    #[tokio::test]
    async fn append_preserves_call_order() {
        let (membership, recorder) = recorder();
        membership.join(42, 7).await.unwrap();
        membership.join(42, 1003).await.unwrap();
        recorder.initialize(42).await.unwrap();

        for (role, content) in [
            ("ROLE_USER", "first"),
            ("ROLE_COUNSELOR", "second"),
            ("ROLE_USER", "third"),
        ] {
            assert!(recorder
                .append(42, role, content, "2025-04-01T10:00:00")
                .await
                .unwrap());
        }

        let buffer = recorder.fetch(42).await.unwrap().unwrap();
        assert_eq!(buffer.messages.len(), 3);
        assert_eq!(buffer.messages[0].content, "first");
        assert_eq!(buffer.messages[1].role, "ROLE_COUNSELOR");
        assert_eq!(buffer.messages[2].content, "third");
        assert_eq!(buffer.messages[2].timestamp, "2025-04-01T10:00:00");
    }

    #[tokio::test]
    async fn append_without_buffer_drops_message() {
        let (_membership, recorder) = recorder();
        assert!(!recorder
            .append(42, "ROLE_USER", "hello", "t")
            .await
            .unwrap());
        assert!(recorder.fetch(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let (membership, recorder) = recorder();
        membership.join(42, 7).await.unwrap();
        membership.join(42, 1003).await.unwrap();
        recorder.initialize(42).await.unwrap();

        recorder.clear(42).await.unwrap();
        recorder.clear(42).await.unwrap();
        assert!(recorder.fetch(42).await.unwrap().is_none());
    }
}
