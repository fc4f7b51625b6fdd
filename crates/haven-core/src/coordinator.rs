//! Session coordinator: interprets signaling events and applies their
//! side effects across the membership store, counselor availability, the
//! video provider, and the transcript recorder.
//!
//! Handlers are safe under concurrent invocation for the same channel.
//! Individual store primitives are atomic, but compound sequences (leave,
//! size check, destroy) are not atomic as a whole; channel destruction is
//! advisory cleanup, so a join racing the cleanup window is tolerated.
//!
//! Failure policy: a failed side effect is logged and skipped. The
//! broadcast response is always produced, because subscribers blocking on
//! a reply is worse than a missed store write.

use std::sync::Arc;

use tracing::{error, info, warn};

use haven_types::channel::{is_counselor_id, ChannelEvent, ChannelId};
use haven_types::identity::AvailabilityStatus;
use haven_types::signal::{
    AccessRequest, AccessResponse, ChatMessageRequest, ChatMessageResponse, ChatRecordRequest,
    ChatRecordResponse, SignalRequest, SignalResponse,
};

use crate::availability::AvailabilityStore;
use crate::dispatch::Dispatch;
use crate::identity::IdentityDirectory;
use crate::plan::{plan, Action};
use crate::recorder::TranscriptRecorder;
use crate::store::{MembershipStore, TranscriptStore};
use crate::video::VideoSessions;

/// Broadcast event for an unparsable signaling event name.
pub const UNKNOWN_EVENT: &str = "unknown";

/// Broadcast event after a transcript-recording message.
pub const RECORD_SENT: &str = "record_sent";

pub struct SessionCoordinator<M, T, A, V, D, P> {
    membership: Arc<M>,
    recorder: TranscriptRecorder<M, T>,
    availability: Arc<A>,
    video: Arc<V>,
    directory: Arc<D>,
    dispatcher: Arc<P>,
}

impl<M, T, A, V, D, P> SessionCoordinator<M, T, A, V, D, P>
where
    M: MembershipStore + 'static,
    T: TranscriptStore + 'static,
    A: AvailabilityStore + 'static,
    V: VideoSessions + 'static,
    D: IdentityDirectory + 'static,
    P: Dispatch + 'static,
{
    pub fn new(
        membership: Arc<M>,
        transcripts: Arc<T>,
        availability: Arc<A>,
        video: Arc<V>,
        directory: Arc<D>,
        dispatcher: Arc<P>,
    ) -> Self {
        Self {
            recorder: TranscriptRecorder::new(membership.clone(), transcripts),
            membership,
            availability,
            video,
            directory,
            dispatcher,
        }
    }

    pub fn recorder(&self) -> &TranscriptRecorder<M, T> {
        &self.recorder
    }

    /// Handle a signaling message and produce the channel broadcast.
    pub async fn handle_signal(
        &self,
        channel_id: ChannelId,
        request: &SignalRequest,
    ) -> SignalResponse {
        let Ok(event) = request.event.parse::<ChannelEvent>() else {
            warn!(channel_id, event = %request.event, "unknown signaling event");
            return SignalResponse {
                channel_id,
                user_id: request.user_id,
                event: UNKNOWN_EVENT.to_string(),
            };
        };

        let plan = plan(event, request, channel_id);
        for action in &plan.actions {
            self.execute(channel_id, *action).await;
        }

        SignalResponse {
            channel_id,
            user_id: request.user_id,
            event: plan.reply.to_string(),
        }
    }

    /// Relay a chat message unmodified.
    pub async fn handle_chat(
        &self,
        _channel_id: ChannelId,
        request: ChatMessageRequest,
    ) -> ChatMessageResponse {
        ChatMessageResponse {
            event: request.event,
            content: request.content,
            user_id: request.user_id,
            nickname: request.nickname,
        }
    }

    /// Append a message to the channel's transcript, then broadcast. A
    /// store failure (or missing buffer) drops the append, never the
    /// broadcast.
    pub async fn handle_chat_record(
        &self,
        channel_id: ChannelId,
        request: ChatRecordRequest,
    ) -> ChatRecordResponse {
        if let Err(err) = self
            .recorder
            .append(
                channel_id,
                &request.role,
                &request.content,
                &request.current_time,
            )
            .await
        {
            error!(channel_id, error = %err, "transcript append failed");
        }

        ChatRecordResponse {
            event: RECORD_SENT.to_string(),
            content: request.content,
            user_id: request.user_id,
            nickname: request.nickname,
            role: request.role,
        }
    }

    /// Echo an access request to the channel so the counselor can accept
    /// or decline it.
    pub async fn handle_access(
        &self,
        _channel_id: ChannelId,
        request: AccessRequest,
    ) -> AccessResponse {
        AccessResponse {
            event: request.event,
            name: request.name,
            birth: request.birth,
            user_id: request.user_id,
            channel_id: request.channel_id,
            role: request.role,
        }
    }

    async fn execute(&self, channel_id: ChannelId, action: Action) {
        match action {
            Action::Join {
                channel_id: target,
                participant_id,
            } => {
                if let Err(err) = self.membership.join(target, participant_id).await {
                    error!(channel_id = target, participant_id, error = %err, "join failed");
                }
            }
            Action::LeaveAndCleanup { participant_id } => {
                match self.membership.leave(channel_id, participant_id).await {
                    Ok(0) => {
                        info!(channel_id, "channel empty; cleaning up");
                        self.destroy(channel_id).await;
                        self.close_video(channel_id).await;
                    }
                    Ok(remaining) => {
                        info!(channel_id, participant_id, remaining, "participant left");
                    }
                    Err(err) => {
                        error!(channel_id, participant_id, error = %err, "leave failed");
                    }
                }
            }
            Action::Remove { participant_id } => {
                if let Err(err) = self.membership.leave(channel_id, participant_id).await {
                    error!(channel_id, participant_id, error = %err, "leave failed");
                }
            }
            Action::JoinAsCounselor { user_id } => {
                match self.directory.counselor_id_for_user(user_id).await {
                    Ok(Some(counselor_id)) => {
                        if let Err(err) = self.membership.join(channel_id, counselor_id).await {
                            error!(channel_id, counselor_id, error = %err, "counselor join failed");
                        }
                    }
                    Ok(None) => {
                        warn!(channel_id, user_id, "no counselor profile for user; join skipped");
                    }
                    Err(err) => {
                        error!(channel_id, user_id, error = %err, "counselor lookup failed");
                    }
                }
            }
            Action::SetAvailability { status } => {
                self.set_counselor_availability(channel_id, status).await;
            }
            Action::Destroy => self.destroy(channel_id).await,
            Action::CloseVideo => self.close_video(channel_id).await,
            Action::InitTranscript => {
                if let Err(err) = self.recorder.initialize(channel_id).await {
                    error!(channel_id, error = %err, "transcript initialization failed");
                }
            }
            Action::Dispatch => {
                let dispatcher = self.dispatcher.clone();
                tokio::spawn(async move {
                    match dispatcher.dispatch(channel_id).await {
                        Ok(outcome) => info!(channel_id, ?outcome, "dispatch finished"),
                        Err(err) => {
                            error!(channel_id, error = %err, "dispatch failed; transcript kept")
                        }
                    }
                });
            }
        }
    }

    /// Flip the availability flag of the channel's counselor member, if
    /// one is present. A missing profile is logged, not propagated.
    async fn set_counselor_availability(&self, channel_id: ChannelId, status: AvailabilityStatus) {
        let members = match self.membership.members(channel_id).await {
            Ok(members) => members,
            Err(err) => {
                error!(channel_id, error = %err, "member lookup failed");
                return;
            }
        };
        let Some(counselor_id) = members.into_iter().find(|id| is_counselor_id(*id)) else {
            warn!(channel_id, "no counselor in channel; availability unchanged");
            return;
        };
        if let Err(err) = self.availability.set_status(counselor_id, status).await {
            warn!(channel_id, counselor_id, error = %err, "availability update failed");
        }
    }

    async fn destroy(&self, channel_id: ChannelId) {
        if let Err(err) = self.membership.destroy(channel_id).await {
            error!(channel_id, error = %err, "channel destroy failed");
        }
    }

    async fn close_video(&self, channel_id: ChannelId) {
        if let Err(err) = self.video.close_session(channel_id).await {
            error!(channel_id, error = %err, "video close failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dispatch::{Dispatch, DispatchOutcome};
    use crate::test_support::{
        CountingVideo, MemoryAvailability, MemoryDirectory, MemoryMembership, MemoryTranscripts,
        RecordingDispatcher,
    };
    use haven_types::error::DispatchError;

    struct Fixture {
        membership: Arc<MemoryMembership>,
        availability: Arc<MemoryAvailability>,
        video: Arc<CountingVideo>,
        dispatcher: Arc<RecordingDispatcher>,
        coordinator: SessionCoordinator<
            MemoryMembership,
            MemoryTranscripts,
            MemoryAvailability,
            CountingVideo,
            MemoryDirectory,
            RecordingDispatcher,
        >,
    }

    fn fixture() -> Fixture {
        let membership = Arc::new(MemoryMembership::default());
        let transcripts = Arc::new(MemoryTranscripts::default());
        let availability = Arc::new(MemoryAvailability::with_profile(1003));
        let video = Arc::new(CountingVideo::default());
        let directory = Arc::new(MemoryDirectory::with_counselor_mapping(9, 1003));
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let coordinator = SessionCoordinator::new(
            membership.clone(),
            transcripts,
            availability.clone(),
            video.clone(),
            directory,
            dispatcher.clone(),
        );
        Fixture {
            membership,
            availability,
            video,
            dispatcher,
            coordinator,
        }
    }

    fn signal(event: &str, user_id: i64) -> SignalRequest {
        SignalRequest {
            event: event.to_string(),
            user_id,
            role: None,
            channel: None,
        }
    }

    async fn wait_for<F: Fn() -> bool>(cond: F) {
        for _ in 0..100 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn join_adds_member_and_replies() {
        let fx = fixture();
        let res = fx.coordinator.handle_signal(42, &signal("join", 7)).await;
        assert_eq!(res.event, "join");
        assert!(fx.membership.members(42).await.unwrap().contains(&7));
    }

    #[tokio::test]
    async fn duplicate_join_is_idempotent() {
        let fx = fixture();
        fx.coordinator.handle_signal(42, &signal("join", 7)).await;
        fx.coordinator.handle_signal(42, &signal("join", 7)).await;
        assert_eq!(fx.membership.members(42).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn last_leave_destroys_channel_and_closes_video() {
        let fx = fixture();
        fx.coordinator.handle_signal(42, &signal("join", 7)).await;

        let res = fx.coordinator.handle_signal(42, &signal("leave", 7)).await;
        assert_eq!(res.event, "leave");
        assert!(fx.membership.members(42).await.unwrap().is_empty());
        assert_eq!(fx.video.closed(42), 1);
    }

    #[tokio::test]
    async fn leave_with_remaining_members_keeps_channel() {
        let fx = fixture();
        fx.coordinator.handle_signal(42, &signal("join", 7)).await;
        fx.coordinator.handle_signal(42, &signal("join", 8)).await;

        fx.coordinator.handle_signal(42, &signal("leave", 7)).await;
        assert!(fx.membership.members(42).await.unwrap().contains(&8));
        assert_eq!(fx.video.closed(42), 0);
    }

    #[tokio::test]
    async fn accepted_moves_user_into_target_channel() {
        let fx = fixture();
        let mut req = signal("accepted", 7);
        req.channel = Some(10001);

        let res = fx.coordinator.handle_signal(42, &req).await;
        assert_eq!(res.event, "page_move");
        assert!(fx.membership.members(10001).await.unwrap().contains(&7));
        assert!(fx.membership.members(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn declined_changes_nothing() {
        let fx = fixture();
        let res = fx.coordinator.handle_signal(42, &signal("declined", 7)).await;
        assert_eq!(res.event, "page_stay");
        assert!(fx.membership.members(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn con_join_resolves_counselor_identity() {
        let fx = fixture();
        let res = fx.coordinator.handle_signal(42, &signal("con_join", 9)).await;
        assert_eq!(res.event, "con_join");
        assert!(fx.membership.members(42).await.unwrap().contains(&1003));
    }

    #[tokio::test]
    async fn con_join_without_profile_skips_join() {
        let fx = fixture();
        fx.coordinator.handle_signal(42, &signal("con_join", 8)).await;
        assert!(fx.membership.members(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn start_marks_counselor_busy_and_initializes_transcript() {
        let fx = fixture();
        fx.coordinator.handle_signal(42, &signal("join", 7)).await;
        fx.coordinator.handle_signal(42, &signal("con_join", 9)).await;

        let res = fx.coordinator.handle_signal(42, &signal("start", 9)).await;
        assert_eq!(res.event, "started");
        assert_eq!(
            fx.availability.get(1003).await.unwrap(),
            Some(AvailabilityStatus::Busy)
        );
        assert!(fx.coordinator.recorder().fetch(42).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn con_leave_frees_counselor_and_tears_down() {
        let fx = fixture();
        fx.coordinator.handle_signal(42, &signal("join", 7)).await;
        fx.coordinator.handle_signal(42, &signal("con_join", 9)).await;
        fx.coordinator.handle_signal(42, &signal("start", 9)).await;

        let res = fx.coordinator.handle_signal(42, &signal("con_leave", 9)).await;
        assert_eq!(res.event, "con_leaved");
        assert_eq!(
            fx.availability.get(1003).await.unwrap(),
            Some(AvailabilityStatus::Available)
        );
        assert!(fx.membership.members(42).await.unwrap().is_empty());
        assert_eq!(fx.video.closed(42), 1);
    }

    #[tokio::test]
    async fn end_hands_off_to_dispatcher() {
        let fx = fixture();
        let res = fx.coordinator.handle_signal(42, &signal("end", 9)).await;
        assert_eq!(res.event, "ended");
        wait_for(|| fx.dispatcher.dispatched() == vec![42]).await;
    }

    #[tokio::test]
    async fn unknown_event_replies_without_state_change() {
        let fx = fixture();
        let res = fx.coordinator.handle_signal(42, &signal("explode", 7)).await;
        assert_eq!(res.event, UNKNOWN_EVENT);
        assert!(fx.membership.members(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_does_not_block_broadcast() {
        let fx = fixture();
        fx.membership.fail_next();
        let res = fx.coordinator.handle_signal(42, &signal("join", 7)).await;
        assert_eq!(res.event, "join");
        assert!(fx.membership.members(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn chat_record_appends_and_broadcasts() {
        let fx = fixture();
        fx.coordinator.handle_signal(42, &signal("join", 7)).await;
        fx.coordinator.handle_signal(42, &signal("con_join", 9)).await;
        fx.coordinator.handle_signal(42, &signal("start", 9)).await;

        let res = fx
            .coordinator
            .handle_chat_record(
                42,
                ChatRecordRequest {
                    event: "record_send".to_string(),
                    role: "ROLE_USER".to_string(),
                    content: "hello".to_string(),
                    user_id: 7,
                    nickname: "jamie".to_string(),
                    current_time: "2025-04-01T10:00:00".to_string(),
                },
            )
            .await;
        assert_eq!(res.event, RECORD_SENT);

        let buffer = fx.coordinator.recorder().fetch(42).await.unwrap().unwrap();
        assert_eq!(buffer.messages.len(), 1);
        assert_eq!(buffer.messages[0].content, "hello");
    }

    #[tokio::test]
    async fn chat_record_without_buffer_still_broadcasts() {
        let fx = fixture();
        let res = fx
            .coordinator
            .handle_chat_record(
                42,
                ChatRecordRequest {
                    event: "record_send".to_string(),
                    role: "ROLE_USER".to_string(),
                    content: "dropped".to_string(),
                    user_id: 7,
                    nickname: "jamie".to_string(),
                    current_time: "t".to_string(),
                },
            )
            .await;
        assert_eq!(res.event, RECORD_SENT);
    }

    #[tokio::test]
    async fn chat_is_relayed_unmodified() {
        let fx = fixture();
        let res = fx
            .coordinator
            .handle_chat(
                42,
                ChatMessageRequest {
                    event: "send".to_string(),
                    content: "hi there".to_string(),
                    user_id: 7,
                    nickname: "jamie".to_string(),
                },
            )
            .await;
        assert_eq!(res.content, "hi there");
        assert_eq!(res.event, "send");
    }

    struct FailingDispatcher;

    impl Dispatch for FailingDispatcher {
        async fn dispatch(&self, _channel_id: ChannelId) -> Result<DispatchOutcome, DispatchError> {
            Err(haven_types::error::StoreError::Connection.into())
        }
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_affect_reply() {
        let membership = Arc::new(MemoryMembership::default());
        let coordinator = SessionCoordinator::new(
            membership,
            Arc::new(MemoryTranscripts::default()),
            Arc::new(MemoryAvailability::default()),
            Arc::new(CountingVideo::default()),
            Arc::new(MemoryDirectory::default()),
            Arc::new(FailingDispatcher),
        );
        let res = coordinator.handle_signal(42, &signal("end", 9)).await;
        assert_eq!(res.event, "ended");
    }
}
