//! Wire payloads for the channel-scoped WebSocket destinations.
//!
//! Each inbound destination mirrors one of the original STOMP mappings:
//! `/{channelId}` (signal), `/{channelId}/chat`, `/{channelId}/chat_recd`,
//! and `/{channelId}/access`. Outbound broadcasts to the channel's
//! subscribers reuse the response shapes defined here.

use serde::{Deserialize, Serialize};

use crate::channel::{ChannelId, ParticipantId};

/// Body of a signaling message on the `/{channelId}` destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRequest {
    /// Free-form event name; parsed into `ChannelEvent` by the coordinator.
    pub event: String,
    pub user_id: ParticipantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Target channel for `accepted` (the user is moved into this channel
    /// rather than the one the message arrived on).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelId>,
}

/// Broadcast sent to `/sub/{channelId}` after a signaling event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalResponse {
    pub channel_id: ChannelId,
    pub user_id: ParticipantId,
    pub event: String,
}

/// Body of a plain chat message on the `/{channelId}/chat` destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub event: String,
    pub content: String,
    pub user_id: ParticipantId,
    pub nickname: String,
}

/// Chat broadcast, relayed unmodified apart from the event normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub event: String,
    pub content: String,
    pub user_id: ParticipantId,
    pub nickname: String,
}

/// Body of a transcript-recording message on `/{channelId}/chat_recd`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecordRequest {
    pub event: String,
    /// Raw role string; stored opaque so unknown roles survive round trips.
    pub role: String,
    pub content: String,
    pub user_id: ParticipantId,
    pub nickname: String,
    /// Caller-supplied timestamp, stored as an opaque field. Not used for
    /// re-ordering.
    pub current_time: String,
}

/// Broadcast after a transcript-recording message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecordResponse {
    pub event: String,
    pub content: String,
    pub user_id: ParticipantId,
    pub nickname: String,
    pub role: String,
}

/// Body of an access request on `/{channelId}/access` (`join_con`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub event: String,
    pub name: String,
    pub birth: String,
    pub user_id: ParticipantId,
    pub channel_id: ChannelId,
    pub role: String,
}

/// Enriched echo of an access request, broadcast to the channel so the
/// counselor sees who is asking to join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessResponse {
    pub event: String,
    pub name: String,
    pub birth: String,
    pub user_id: ParticipantId,
    pub channel_id: ChannelId,
    pub role: String,
}
