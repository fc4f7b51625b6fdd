//! Summarization types: the summarizer's message format and structured
//! outcome, the persisted summary record, and the archived-log reference.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::channel::{ChannelId, ParticipantId};

/// A message in the vocabulary the external summarizer expects
/// (`assistant` / `user`, plus pass-through for anything unrecognized).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizerMessage {
    pub role: String,
    pub content: String,
}

/// Structured result returned by the summarizer.
///
/// The contract requires a non-empty `topic`; everything else may be
/// blank. `next_schedule` is a free-form date string, normalized later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOutcome {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub treatment: String,
    #[serde(default)]
    pub counselor_note: String,
    #[serde(default)]
    pub next_schedule: String,
}

/// Persisted summary of one counseling conversation. Immutable once
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: Uuid,
    pub user_id: ParticipantId,
    pub counselor_id: ParticipantId,
    pub topic: String,
    pub symptoms: String,
    pub treatment: String,
    pub counselor_note: String,
    /// Normalized next-appointment time; `None` when the summarizer's
    /// date string was blank or unparsable.
    pub next_schedule: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
}

/// Blob-store keys for one archived transcript: the raw JSON document and
/// a human-readable rendering. Written once per dispatch, independent of
/// whether the summary record itself persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedLog {
    pub id: Uuid,
    pub user_id: ParticipantId,
    pub counselor_id: ParticipantId,
    pub channel_id: ChannelId,
    pub raw_key: String,
    pub text_key: String,
    pub uploaded_at: DateTime<Utc>,
}
