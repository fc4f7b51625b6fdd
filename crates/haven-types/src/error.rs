use thiserror::Error;

/// Errors from the shared channel store (membership sets and transcript
/// buffers).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error")]
    Connection,

    #[error("store operation failed: {0}")]
    Operation(String),

    #[error("invalid stored document: {0}")]
    Encoding(String),
}

/// Errors from the video-conferencing provider.
///
/// `NotFound` is an expected outcome at most call sites (double close,
/// close-before-create, token for a torn-down session) and is treated as
/// success by cleanup paths.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("video session not found")]
    NotFound,

    #[error("video provider error: {0}")]
    Provider(String),
}

/// Errors from the external summarizer.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarizer request failed: {0}")]
    Http(String),

    #[error("summarizer response could not be decoded: {0}")]
    Deserialization(String),

    #[error("malformed summarizer response: {0}")]
    MalformedResponse(String),
}

/// Errors from the blob store used for transcript archival.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob write failed: {0}")]
    Io(String),
}

/// Errors from relational persistence (summaries, archived logs,
/// counselor profiles, access tokens).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Composite error for a summarization dispatch attempt. A failed
/// dispatch leaves the transcript buffer in place for a later retry.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Blob(#[from] BlobError),
}
