//! Session coordination logic for Haven.
//!
//! This crate defines the trait seams toward the shared channel store and
//! the three external collaborators (video provider, summarizer, blob
//! store), plus the services composed from them:
//!
//! - [`recorder::TranscriptRecorder`]: per-channel transcript buffer.
//! - [`dispatch::SummarizationDispatcher`]: drains a transcript into the
//!   summarizer, persists and archives the result.
//! - [`coordinator::SessionCoordinator`]: the event state machine driving
//!   membership, availability, video sessions, and dispatch.
//!
//! All traits use native async fn in traits (RPITIT); implementations
//! live in `haven-infra`. The coordinator holds no authoritative state of
//! its own: the shared store is the single source of truth, so the
//! gateway can scale horizontally.

pub mod availability;
pub mod blob;
pub mod coordinator;
pub mod dispatch;
pub mod identity;
pub mod plan;
pub mod recorder;
pub mod repository;
pub mod store;
pub mod summarize;
pub mod video;

#[cfg(test)]
pub(crate) mod test_support;
