//! Channel membership store trait.
//!
//! One participant-id set per channel. Implementations live in
//! haven-infra.

use std::collections::BTreeSet;

use haven_types::channel::{ChannelId, ParticipantId};
use haven_types::error::StoreError;

/// Atomic set operations over per-channel membership.
///
/// `join` is idempotent (set semantics). `leave` returns the remaining
/// cardinality; callers must treat zero as "channel empty" and run
/// cleanup themselves; the store never auto-cleans.
pub trait MembershipStore: Send + Sync {
    /// Add a participant to the channel's set. Idempotent.
    fn join(
        &self,
        channel_id: ChannelId,
        participant_id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Remove a participant and return the set's remaining cardinality.
    /// Removing a non-member is a no-op that still reports the size.
    fn leave(
        &self,
        channel_id: ChannelId,
        participant_id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// The full member set, empty if the channel does not exist.
    fn members(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<BTreeSet<ParticipantId>, StoreError>> + Send;

    /// Delete the set key entirely. Idempotent.
    fn destroy(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
