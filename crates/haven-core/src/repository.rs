//! Relational persistence traits for dispatch results.

use haven_types::channel::ParticipantId;
use haven_types::error::RepositoryError;
use haven_types::summary::{ArchivedLog, SummaryRecord};

/// Persists summary records. One record per successful dispatch;
/// immutable after creation.
pub trait SummaryRepository: Send + Sync {
    fn insert(
        &self,
        record: &SummaryRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Persists archived-log references (blob-store keys).
pub trait ArchiveRepository: Send + Sync {
    fn insert(
        &self,
        log: &ArchivedLog,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All archives for a counselor, newest first.
    fn list_for_counselor(
        &self,
        counselor_id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<Vec<ArchivedLog>, RepositoryError>> + Send;
}
