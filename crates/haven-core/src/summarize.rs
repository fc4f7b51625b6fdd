//! External summarizer trait.

use haven_types::error::SummarizeError;
use haven_types::summary::{SummarizerMessage, SummaryOutcome};

/// Contract with the external summarization endpoint.
///
/// Implementations must return [`SummarizeError::MalformedResponse`] when
/// the result lacks a non-empty topic; the dispatcher treats that as a
/// failed attempt (transcript preserved), never as a partial success.
pub trait Summarizer: Send + Sync {
    fn summarize(
        &self,
        messages: &[SummarizerMessage],
    ) -> impl std::future::Future<Output = Result<SummaryOutcome, SummarizeError>> + Send;
}
