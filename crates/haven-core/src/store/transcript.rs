//! Transcript buffer store trait.
//!
//! The buffer is one JSON document per channel. Append is a
//! read-modify-write performed by
//! [`crate::recorder::TranscriptRecorder`]; this trait only exposes the
//! whole-document primitives the store can do atomically.

use haven_types::channel::ChannelId;
use haven_types::error::StoreError;
use haven_types::transcript::TranscriptBuffer;

/// Whole-document operations over per-channel transcript buffers.
pub trait TranscriptStore: Send + Sync {
    /// Write the buffer document, overwriting any prior one.
    fn write(
        &self,
        buffer: &TranscriptBuffer,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Read the buffer, or `None` when no conversation is in flight.
    fn read(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<Option<TranscriptBuffer>, StoreError>> + Send;

    /// Delete the buffer key. Idempotent.
    fn clear(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
