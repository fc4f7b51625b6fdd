//! In-memory fakes for the coordinator's collaborator traits.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use haven_types::channel::{ChannelId, ParticipantId};
use haven_types::error::{
    BlobError, DispatchError, RepositoryError, StoreError, SummarizeError, VideoError,
};
use haven_types::identity::AvailabilityStatus;
use haven_types::summary::{ArchivedLog, SummarizerMessage, SummaryOutcome, SummaryRecord};
use haven_types::transcript::TranscriptBuffer;

use crate::availability::AvailabilityStore;
use crate::blob::BlobStore;
use crate::dispatch::{Dispatch, DispatchOutcome};
use crate::identity::IdentityDirectory;
use crate::repository::{ArchiveRepository, SummaryRepository};
use crate::store::{MembershipStore, TranscriptStore};
use crate::summarize::Summarizer;
use crate::video::VideoSessions;

#[derive(Default)]
pub(crate) struct MemoryMembership {
    channels: Mutex<HashMap<ChannelId, BTreeSet<ParticipantId>>>,
    fail_next: AtomicBool,
}

impl MemoryMembership {
    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            Err(StoreError::Connection)
        } else {
            Ok(())
        }
    }
}

impl MembershipStore for MemoryMembership {
    async fn join(
        &self,
        channel_id: ChannelId,
        participant_id: ParticipantId,
    ) -> Result<(), StoreError> {
        self.take_failure()?;
        self.channels
            .lock()
            .unwrap()
            .entry(channel_id)
            .or_default()
            .insert(participant_id);
        Ok(())
    }

    async fn leave(
        &self,
        channel_id: ChannelId,
        participant_id: ParticipantId,
    ) -> Result<u64, StoreError> {
        self.take_failure()?;
        let mut channels = self.channels.lock().unwrap();
        let members = channels.entry(channel_id).or_default();
        members.remove(&participant_id);
        Ok(members.len() as u64)
    }

    async fn members(&self, channel_id: ChannelId) -> Result<BTreeSet<ParticipantId>, StoreError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .get(&channel_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn destroy(&self, channel_id: ChannelId) -> Result<(), StoreError> {
        self.channels.lock().unwrap().remove(&channel_id);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryTranscripts {
    buffers: Mutex<HashMap<ChannelId, TranscriptBuffer>>,
}

impl TranscriptStore for MemoryTranscripts {
    async fn write(&self, buffer: &TranscriptBuffer) -> Result<(), StoreError> {
        self.buffers
            .lock()
            .unwrap()
            .insert(buffer.channel_id, buffer.clone());
        Ok(())
    }

    async fn read(&self, channel_id: ChannelId) -> Result<Option<TranscriptBuffer>, StoreError> {
        Ok(self.buffers.lock().unwrap().get(&channel_id).cloned())
    }

    async fn clear(&self, channel_id: ChannelId) -> Result<(), StoreError> {
        self.buffers.lock().unwrap().remove(&channel_id);
        Ok(())
    }
}

pub(crate) struct MemoryAvailability {
    profiles: Mutex<HashMap<ParticipantId, AvailabilityStatus>>,
}

impl Default for MemoryAvailability {
    fn default() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
        }
    }
}

impl MemoryAvailability {
    pub(crate) fn with_profile(counselor_id: ParticipantId) -> Self {
        let fake = Self::default();
        fake.profiles
            .lock()
            .unwrap()
            .insert(counselor_id, AvailabilityStatus::Available);
        fake
    }
}

impl AvailabilityStore for MemoryAvailability {
    async fn set_status(
        &self,
        counselor_id: ParticipantId,
        status: AvailabilityStatus,
    ) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.lock().unwrap();
        match profiles.get_mut(&counselor_id) {
            Some(slot) => {
                *slot = status;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn get(
        &self,
        counselor_id: ParticipantId,
    ) -> Result<Option<AvailabilityStatus>, RepositoryError> {
        Ok(self.profiles.lock().unwrap().get(&counselor_id).copied())
    }
}

#[derive(Default)]
pub(crate) struct CountingVideo {
    active: Mutex<HashSet<ChannelId>>,
    closes: Mutex<HashMap<ChannelId, usize>>,
}

impl CountingVideo {
    pub(crate) fn closed(&self, channel_id: ChannelId) -> usize {
        self.closes
            .lock()
            .unwrap()
            .get(&channel_id)
            .copied()
            .unwrap_or(0)
    }
}

impl VideoSessions for CountingVideo {
    async fn ensure_session(&self, channel_id: ChannelId) -> Result<String, VideoError> {
        self.active.lock().unwrap().insert(channel_id);
        Ok(format!("session-{channel_id}"))
    }

    async fn create_token(&self, channel_id: ChannelId) -> Result<String, VideoError> {
        if self.active.lock().unwrap().contains(&channel_id) {
            Ok(format!("token-{channel_id}"))
        } else {
            Err(VideoError::NotFound)
        }
    }

    async fn close_session(&self, channel_id: ChannelId) -> Result<(), VideoError> {
        self.active.lock().unwrap().remove(&channel_id);
        *self.closes.lock().unwrap().entry(channel_id).or_insert(0) += 1;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryDirectory {
    names: HashMap<ParticipantId, String>,
    counselors: HashMap<ParticipantId, ParticipantId>,
}

impl MemoryDirectory {
    pub(crate) fn with_counselor_mapping(
        user_id: ParticipantId,
        counselor_id: ParticipantId,
    ) -> Self {
        let mut fake = Self::default();
        fake.counselors.insert(user_id, counselor_id);
        fake
    }
}

impl IdentityDirectory for MemoryDirectory {
    async fn display_name(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self.names.get(&participant_id).cloned())
    }

    async fn counselor_id_for_user(
        &self,
        user_id: ParticipantId,
    ) -> Result<Option<ParticipantId>, RepositoryError> {
        Ok(self.counselors.get(&user_id).copied())
    }
}

pub(crate) struct StubSummarizer {
    result: Result<SummaryOutcome, String>,
}

impl StubSummarizer {
    pub(crate) fn returning(outcome: SummaryOutcome) -> Self {
        Self {
            result: Ok(outcome),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

impl Summarizer for StubSummarizer {
    async fn summarize(
        &self,
        _messages: &[SummarizerMessage],
    ) -> Result<SummaryOutcome, SummarizeError> {
        match &self.result {
            Ok(outcome) => Ok(outcome.clone()),
            Err(message) => Err(SummarizeError::Http(message.clone())),
        }
    }
}

#[derive(Default)]
pub(crate) struct MemorySummaries {
    records: Mutex<Vec<SummaryRecord>>,
    fail_next: AtomicBool,
}

impl MemorySummaries {
    pub(crate) fn records(&self) -> Vec<SummaryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl SummaryRepository for MemorySummaries {
    async fn insert(&self, record: &SummaryRecord) -> Result<(), RepositoryError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryArchives {
    logs: Mutex<Vec<ArchivedLog>>,
}

impl MemoryArchives {
    pub(crate) fn logs(&self) -> Vec<ArchivedLog> {
        self.logs.lock().unwrap().clone()
    }
}

impl ArchiveRepository for MemoryArchives {
    async fn insert(&self, log: &ArchivedLog) -> Result<(), RepositoryError> {
        self.logs.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn list_for_counselor(
        &self,
        counselor_id: ParticipantId,
    ) -> Result<Vec<ArchivedLog>, RepositoryError> {
        let mut logs: Vec<ArchivedLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.counselor_id == counselor_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(logs)
    }
}

#[derive(Default)]
pub(crate) struct MemoryBlob {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlob {
    pub(crate) fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

impl BlobStore for MemoryBlob {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, BlobError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(key.to_string())
    }
}

pub(crate) struct FlakyBlob;

impl BlobStore for FlakyBlob {
    async fn put(&self, _key: &str, _bytes: &[u8]) -> Result<String, BlobError> {
        Err(BlobError::Io("upload refused".to_string()))
    }
}

#[derive(Default)]
pub(crate) struct RecordingDispatcher {
    channels: Mutex<Vec<ChannelId>>,
}

impl RecordingDispatcher {
    pub(crate) fn dispatched(&self) -> Vec<ChannelId> {
        self.channels.lock().unwrap().clone()
    }
}

impl Dispatch for RecordingDispatcher {
    async fn dispatch(&self, channel_id: ChannelId) -> Result<DispatchOutcome, DispatchError> {
        self.channels.lock().unwrap().push(channel_id);
        Ok(DispatchOutcome::Skipped)
    }
}
