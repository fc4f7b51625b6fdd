//! Summarization dispatch: drain a channel's transcript into a persisted
//! summary plus an archived copy of the conversation.
//!
//! Delivery is at-least-once by non-deletion: the transcript buffer is
//! cleared only after every step succeeds, so a duplicate `end` event (or
//! a manual retry) re-attempts a failed dispatch, while a duplicate after
//! success finds no buffer and becomes a no-op.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use haven_types::channel::ChannelId;
use haven_types::error::{BlobError, DispatchError, SummarizeError};
use haven_types::summary::{ArchivedLog, SummarizerMessage, SummaryRecord};
use haven_types::transcript::{TranscriptBuffer, TranscriptEntry};

use crate::blob::BlobStore;
use crate::identity::IdentityDirectory;
use crate::repository::{ArchiveRepository, SummaryRepository};
use crate::store::TranscriptStore;
use crate::summarize::Summarizer;

/// Result of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No transcript buffer existed (duplicate `end`, or `end` without a
    /// prior `start`).
    Skipped,
    /// Summary persisted, transcript archived, buffer cleared.
    Completed { summary_id: Uuid },
}

/// Seam between the coordinator and the summarization pipeline. The
/// coordinator runs this off the broadcast path and only logs the result.
pub trait Dispatch: Send + Sync {
    fn dispatch(
        &self,
        channel_id: ChannelId,
    ) -> impl std::future::Future<Output = Result<DispatchOutcome, DispatchError>> + Send;
}

/// Translate a stored role into the summarizer's vocabulary. Unknown
/// roles pass through unchanged so the summarizer sees them verbatim.
pub fn translate_role(role: &str) -> String {
    match role {
        "ROLE_COUNSELOR" => "assistant".to_string(),
        "ROLE_USER" => "user".to_string(),
        other => other.to_string(),
    }
}

/// The transcript in summarizer message form, in append order.
pub fn to_summarizer_messages(entries: &[TranscriptEntry]) -> Vec<SummarizerMessage> {
    entries
        .iter()
        .map(|entry| SummarizerMessage {
            role: translate_role(&entry.role),
            content: entry.content.clone(),
        })
        .collect()
}

/// Normalize the summarizer's free-form `next_schedule` string. Accepts
/// `YYYY-MM-DD` (mapped to midnight); anything else, including an empty
/// string, becomes `None`.
pub fn parse_next_schedule(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date.and_time(NaiveTime::MIN)),
        Err(_) => {
            warn!(next_schedule = raw, "unparsable next_schedule; storing none");
            None
        }
    }
}

/// Human-readable rendering of a transcript for the text archive.
pub fn render_transcript(
    buffer: &TranscriptBuffer,
    user_name: &str,
    counselor_name: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Counseling transcript (channel {})\nUser: {}\nCounselor: {}\n\n",
        buffer.channel_id, user_name, counselor_name
    ));
    for entry in &buffer.messages {
        let speaker = match entry.role.as_str() {
            "ROLE_COUNSELOR" => counselor_name,
            "ROLE_USER" => user_name,
            other => other,
        };
        out.push_str(&format!("[{}] {}: {}\n", entry.timestamp, speaker, entry.content));
    }
    out
}

/// Runs the end-of-session pipeline: fetch, summarize, persist, archive,
/// clear.
pub struct SummarizationDispatcher<T, S, R, A, B, D> {
    transcripts: Arc<T>,
    summarizer: Arc<S>,
    summaries: Arc<R>,
    archives: Arc<A>,
    blobs: Arc<B>,
    directory: Arc<D>,
}

impl<T, S, R, A, B, D> SummarizationDispatcher<T, S, R, A, B, D>
where
    T: TranscriptStore,
    S: Summarizer,
    R: SummaryRepository,
    A: ArchiveRepository,
    B: BlobStore,
    D: IdentityDirectory,
{
    pub fn new(
        transcripts: Arc<T>,
        summarizer: Arc<S>,
        summaries: Arc<R>,
        archives: Arc<A>,
        blobs: Arc<B>,
        directory: Arc<D>,
    ) -> Self {
        Self {
            transcripts,
            summarizer,
            summaries,
            archives,
            blobs,
            directory,
        }
    }

    async fn name_for(&self, participant_id: i64) -> String {
        match self.directory.display_name(participant_id).await {
            Ok(Some(name)) => name,
            Ok(None) => participant_id.to_string(),
            Err(err) => {
                warn!(participant_id, error = %err, "display-name lookup failed");
                participant_id.to_string()
            }
        }
    }

    /// Archive the raw document and a readable rendering, then record the
    /// keys. Runs regardless of whether the summary row persisted, so the
    /// conversation is never lost to a database hiccup.
    async fn archive(&self, buffer: &TranscriptBuffer) -> Result<ArchivedLog, DispatchError> {
        let raw = serde_json::to_vec(buffer)
            .map_err(|err| BlobError::Io(format!("transcript encoding: {err}")))?;

        let user_name = self.name_for(buffer.user_id).await;
        let counselor_name = self.name_for(buffer.counselor_id).await;
        let rendered = render_transcript(buffer, &user_name, &counselor_name);

        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let base = format!(
            "counselor_{}_user_{}_{stamp}",
            buffer.counselor_id, buffer.user_id
        );
        let raw_key = self
            .blobs
            .put(&format!("summarylogs/json/{base}.json"), &raw)
            .await?;
        let text_key = self
            .blobs
            .put(&format!("summarylogs/text/{base}.txt"), rendered.as_bytes())
            .await?;

        let log = ArchivedLog {
            id: Uuid::now_v7(),
            user_id: buffer.user_id,
            counselor_id: buffer.counselor_id,
            channel_id: buffer.channel_id,
            raw_key,
            text_key,
            uploaded_at: Utc::now(),
        };
        self.archives.insert(&log).await?;
        Ok(log)
    }
}

impl<T, S, R, A, B, D> Dispatch for SummarizationDispatcher<T, S, R, A, B, D>
where
    T: TranscriptStore,
    S: Summarizer,
    R: SummaryRepository,
    A: ArchiveRepository,
    B: BlobStore,
    D: IdentityDirectory,
{
    async fn dispatch(&self, channel_id: ChannelId) -> Result<DispatchOutcome, DispatchError> {
        let Some(buffer) = self.transcripts.read(channel_id).await? else {
            debug!(channel_id, "no transcript to dispatch");
            return Ok(DispatchOutcome::Skipped);
        };

        let messages = to_summarizer_messages(&buffer.messages);
        let outcome = self.summarizer.summarize(&messages).await?;
        if outcome.topic.trim().is_empty() {
            return Err(
                SummarizeError::MalformedResponse("summary topic is empty".to_string()).into(),
            );
        }

        let record = SummaryRecord {
            id: Uuid::now_v7(),
            user_id: buffer.user_id,
            counselor_id: buffer.counselor_id,
            topic: outcome.topic,
            symptoms: outcome.symptoms,
            treatment: outcome.treatment,
            counselor_note: outcome.counselor_note,
            next_schedule: parse_next_schedule(&outcome.next_schedule),
            created_at: Utc::now(),
        };
        let persisted = self.summaries.insert(&record).await;
        if let Err(err) = &persisted {
            warn!(channel_id, error = %err, "summary persistence failed");
        }

        // Archival proceeds even when the summary row failed to persist.
        let archived = self.archive(&buffer).await;
        if let Err(err) = &archived {
            warn!(channel_id, error = %err, "transcript archival failed");
        }

        persisted?;
        archived?;

        self.transcripts.clear(channel_id).await?;
        info!(channel_id, summary_id = %record.id, "summarization dispatch complete");
        Ok(DispatchOutcome::Completed {
            summary_id: record.id,
        })
    }
}
