//! Counselor availability store trait.
//!
//! Two-state flag per counselor, flipped by the coordinator at lifecycle
//! points (`start` → busy, `con_leave` → available). No transition
//! validation: any state can follow any other.

use haven_types::channel::ParticipantId;
use haven_types::error::RepositoryError;
use haven_types::identity::AvailabilityStatus;

pub trait AvailabilityStore: Send + Sync {
    /// Set a counselor's status. `Err(NotFound)` when no profile exists;
    /// callers log that and continue with the event's other side effects.
    fn set_status(
        &self,
        counselor_id: ParticipantId,
        status: AvailabilityStatus,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Current status, or `None` for an unknown counselor.
    fn get(
        &self,
        counselor_id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<Option<AvailabilityStatus>, RepositoryError>> + Send;
}
