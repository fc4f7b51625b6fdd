//! Channel and participant identifiers, plus the signaling event enum.
//!
//! A channel is ephemeral: it exists only while it has members in the
//! shared store, so there is no `Channel` record type here, just the id
//! space and the events that drive its lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Channel identifier. Channels are created implicitly on first join and
/// destroyed when their membership reaches zero.
pub type ChannelId = i64;

/// Participant identifier. The id space is partitioned by convention:
/// ids below [`COUNSELOR_ID_FLOOR`] are ordinary users, ids at or above it
/// are counselor identities.
pub type ParticipantId = i64;

/// First id of the counselor identity range.
pub const COUNSELOR_ID_FLOOR: ParticipantId = 1000;

/// Whether a participant id falls in the counselor identity range.
pub fn is_counselor_id(id: ParticipantId) -> bool {
    id >= COUNSELOR_ID_FLOOR
}

/// A signaling event on a channel destination.
///
/// Wire payloads carry the event as a free-form string; parsing it into
/// this enum makes unknown events a typed, testable case instead of a
/// default switch branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelEvent {
    /// A participant joins a voice channel.
    Join,
    /// A participant leaves; an emptied channel is cleaned up.
    Leave,
    /// A counselor accepted a pending access request.
    Accepted,
    /// A counselor declined a pending access request.
    Declined,
    /// A counselor enters their counseling room.
    ConJoin,
    /// The counselor leaves; the room is torn down.
    ConLeave,
    /// A user leaves a counseling room.
    UserLeave,
    /// The counselor begins the conversation (transcript starts).
    Start,
    /// The counselor ends the conversation (summarization dispatch).
    End,
}

impl ChannelEvent {
    /// The broadcast event name sent to channel subscribers after this
    /// event has been handled.
    pub fn reply(self) -> &'static str {
        match self {
            ChannelEvent::Join => "join",
            ChannelEvent::Leave => "leave",
            ChannelEvent::Accepted => "page_move",
            ChannelEvent::Declined => "page_stay",
            ChannelEvent::ConJoin => "con_join",
            ChannelEvent::ConLeave => "con_leaved",
            ChannelEvent::UserLeave => "user_leaved",
            ChannelEvent::Start => "started",
            ChannelEvent::End => "ended",
        }
    }
}

impl fmt::Display for ChannelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelEvent::Join => "join",
            ChannelEvent::Leave => "leave",
            ChannelEvent::Accepted => "accepted",
            ChannelEvent::Declined => "declined",
            ChannelEvent::ConJoin => "con_join",
            ChannelEvent::ConLeave => "con_leave",
            ChannelEvent::UserLeave => "user_leave",
            ChannelEvent::Start => "start",
            ChannelEvent::End => "end",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ChannelEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "join" => Ok(ChannelEvent::Join),
            "leave" => Ok(ChannelEvent::Leave),
            "accepted" => Ok(ChannelEvent::Accepted),
            "declined" => Ok(ChannelEvent::Declined),
            "con_join" => Ok(ChannelEvent::ConJoin),
            "con_leave" => Ok(ChannelEvent::ConLeave),
            "user_leave" => Ok(ChannelEvent::UserLeave),
            "start" => Ok(ChannelEvent::Start),
            "end" => Ok(ChannelEvent::End),
            other => Err(format!("unknown channel event: '{other}'")),
        }
    }
}
