//! Video-conferencing provider trait.
//!
//! Sessions are keyed by channel id; no local record is kept beyond that
//! key. Close must tolerate "not found" as a normal outcome (double
//! close, or close-before-create races).

use haven_types::channel::ChannelId;
use haven_types::error::VideoError;

pub trait VideoSessions: Send + Sync {
    /// Fetch or create the session named after the channel id. Returns the
    /// provider's opaque session handle.
    fn ensure_session(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<String, VideoError>> + Send;

    /// Mint a participant join token for the active session.
    /// `Err(NotFound)` when no session exists for the channel.
    fn create_token(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<String, VideoError>> + Send;

    /// Close the session if it is active; closing a missing session is a
    /// successful no-op.
    fn close_session(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<(), VideoError>> + Send;
}
