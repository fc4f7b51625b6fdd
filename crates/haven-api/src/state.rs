//! Application state wiring all backends together.
//!
//! The coordinator and dispatcher are generic over the store and
//! collaborator traits; AppState pins them to the concrete infra
//! implementations and shares everything behind `Arc`s.

use std::path::PathBuf;
use std::sync::Arc;

use haven_core::coordinator::SessionCoordinator;
use haven_core::dispatch::SummarizationDispatcher;
use haven_infra::llm::OpenAiCompatSummarizer;
use haven_infra::sqlite::{
    DatabasePool, SqliteArchiveRepository, SqliteAvailabilityStore, SqliteChannelStore,
    SqliteDirectory, SqliteSummaryRepository, SqliteTokenValidator,
};
use haven_infra::storage::LocalBlobStore;
use haven_infra::video::OpenViduClient;
use haven_types::config::HavenConfig;

use crate::hub::ChannelHub;

/// Concrete type aliases for the coordinator generics pinned to infra.
pub type ConcreteDispatcher = SummarizationDispatcher<
    SqliteChannelStore,
    OpenAiCompatSummarizer,
    SqliteSummaryRepository,
    SqliteArchiveRepository,
    LocalBlobStore,
    SqliteDirectory,
>;

pub type ConcreteCoordinator = SessionCoordinator<
    SqliteChannelStore,
    SqliteChannelStore,
    SqliteAvailabilityStore,
    OpenViduClient,
    SqliteDirectory,
    ConcreteDispatcher,
>;

/// Shared application state for the gateway and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ConcreteCoordinator>,
    pub hub: Arc<ChannelHub>,
    pub video: Arc<OpenViduClient>,
    pub summaries: Arc<SqliteSummaryRepository>,
    pub archives: Arc<SqliteArchiveRepository>,
    pub tokens: Arc<SqliteTokenValidator>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Connect to the database and wire every backend.
    pub async fn init(config: &HavenConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("haven.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        let channel_store = Arc::new(SqliteChannelStore::new(db_pool.clone()));
        let availability = Arc::new(SqliteAvailabilityStore::new(db_pool.clone()));
        let directory = Arc::new(SqliteDirectory::new(db_pool.clone()));
        let video = Arc::new(OpenViduClient::new(&config.video));

        let archive_dir = config
            .archive
            .dir
            .clone()
            .unwrap_or_else(|| data_dir.join("archives"));
        let blobs = Arc::new(LocalBlobStore::new(archive_dir));

        let summaries = Arc::new(SqliteSummaryRepository::new(db_pool.clone()));
        let archives = Arc::new(SqliteArchiveRepository::new(db_pool.clone()));
        let summarizer = Arc::new(OpenAiCompatSummarizer::new(&config.summarizer));

        let dispatcher = Arc::new(SummarizationDispatcher::new(
            channel_store.clone(),
            summarizer,
            summaries.clone(),
            archives.clone(),
            blobs,
            directory.clone(),
        ));

        let coordinator = Arc::new(SessionCoordinator::new(
            channel_store.clone(),
            channel_store,
            availability,
            video.clone(),
            directory,
            dispatcher,
        ));

        Ok(Self {
            coordinator,
            hub: Arc::new(ChannelHub::new()),
            video,
            summaries,
            archives,
            tokens: Arc::new(SqliteTokenValidator::new(db_pool.clone())),
            data_dir,
            db_pool,
        })
    }
}
