//! Identity collaborator traits: token validation for the gateway and
//! directory lookups for archival rendering and counselor resolution.

use haven_types::channel::ParticipantId;
use haven_types::error::RepositoryError;
use haven_types::identity::Identity;

/// Validates a bearer token presented on connect.
///
/// Returns `Ok(None)` for an unknown/invalid token; the gateway lets such
/// connections proceed unauthenticated rather than rejecting them.
pub trait IdentityValidator: Send + Sync {
    fn validate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<Identity>, RepositoryError>> + Send;
}

/// Directory lookups against the platform's identity records.
pub trait IdentityDirectory: Send + Sync {
    /// Display name for a participant (user nickname or counselor name).
    fn display_name(
        &self,
        participant_id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Resolve the counselor identity for a signed-in user id, used when a
    /// counselor joins their counseling room under their user account.
    fn counselor_id_for_user(
        &self,
        user_id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<Option<ParticipantId>, RepositoryError>> + Send;
}
