//! Pure planning step of the signaling pipeline.
//!
//! [`plan`] maps one parsed [`ChannelEvent`] to the ordered side effects
//! it implies plus the broadcast event name. Keeping this a pure function
//! makes the transition table testable without any store or provider.

use haven_types::channel::{ChannelEvent, ChannelId, ParticipantId};
use haven_types::identity::AvailabilityStatus;
use haven_types::signal::SignalRequest;

/// One side effect the coordinator must execute for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Add the participant to a channel's member set. The target may
    /// differ from the channel the message arrived on (`accepted` moves
    /// the user into the counselor's room).
    Join {
        channel_id: ChannelId,
        participant_id: ParticipantId,
    },
    /// Remove the participant; if the channel is then empty, destroy the
    /// member set and close the channel's video session.
    LeaveAndCleanup { participant_id: ParticipantId },
    /// Remove the participant with no emptiness check.
    Remove { participant_id: ParticipantId },
    /// Resolve the sender's counselor identity and add it to the channel.
    JoinAsCounselor { user_id: ParticipantId },
    /// Flip the availability flag of the channel's counselor member.
    SetAvailability { status: AvailabilityStatus },
    /// Delete the channel's member set.
    Destroy,
    /// Close the channel's video session (missing session is fine).
    CloseVideo,
    /// Start a fresh transcript buffer for the channel.
    InitTranscript,
    /// Hand the channel to the summarization dispatcher.
    Dispatch,
}

/// The planned handling of one signaling event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub actions: Vec<Action>,
    /// Event name for the broadcast to channel subscribers.
    pub reply: &'static str,
}

/// The signaling transition table.
///
/// `channel_id` is the channel the message arrived on; `accepted` reads
/// its target from the request body and falls back to the arrival channel
/// when the body omits one.
pub fn plan(event: ChannelEvent, request: &SignalRequest, channel_id: ChannelId) -> Plan {
    let actions = match event {
        ChannelEvent::Join => vec![Action::Join {
            channel_id,
            participant_id: request.user_id,
        }],
        ChannelEvent::Leave => vec![Action::LeaveAndCleanup {
            participant_id: request.user_id,
        }],
        ChannelEvent::Accepted => vec![Action::Join {
            channel_id: request.channel.unwrap_or(channel_id),
            participant_id: request.user_id,
        }],
        ChannelEvent::Declined => vec![],
        ChannelEvent::ConJoin => vec![Action::JoinAsCounselor {
            user_id: request.user_id,
        }],
        ChannelEvent::ConLeave => vec![
            Action::SetAvailability {
                status: AvailabilityStatus::Available,
            },
            Action::Destroy,
            Action::CloseVideo,
        ],
        ChannelEvent::UserLeave => vec![Action::Remove {
            participant_id: request.user_id,
        }],
        ChannelEvent::Start => vec![
            Action::SetAvailability {
                status: AvailabilityStatus::Busy,
            },
            Action::InitTranscript,
        ],
        ChannelEvent::End => vec![Action::Dispatch],
    };

    Plan {
        actions,
        reply: event.reply(),
    }
}
