//! SQLite implementations of the `haven-core` storage traits.
//!
//! One database serves two roles: the shared channel store (membership
//! sets and transcript buffers, both ephemeral) and the durable platform
//! records (profiles, summaries, archives, tokens). The split
//! reader/writer pool in [`pool`] keeps writes serialized.

pub mod archive;
pub mod availability;
pub mod channel;
pub mod identity;
pub mod pool;
pub mod summary;
pub mod token;

pub use archive::SqliteArchiveRepository;
pub use availability::SqliteAvailabilityStore;
pub use channel::SqliteChannelStore;
pub use identity::SqliteDirectory;
pub use pool::DatabasePool;
pub use summary::SqliteSummaryRepository;
pub use token::SqliteTokenValidator;

#[cfg(test)]
pub(crate) async fn test_pool() -> DatabasePool {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    std::mem::forget(dir);
    DatabasePool::new(&url).await.unwrap()
}

#[cfg(test)]
pub(crate) async fn insert_user(pool: &DatabasePool, id: i64, nickname: &str) {
    sqlx::query("INSERT INTO users (id, nickname, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(nickname)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();
}

#[cfg(test)]
pub(crate) async fn insert_counselor(
    pool: &DatabasePool,
    counselor_id: i64,
    user_id: i64,
    display_name: &str,
) {
    sqlx::query(
        "INSERT INTO counselor_profiles (counselor_id, user_id, display_name, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(counselor_id)
    .bind(user_id)
    .bind(display_name)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(&pool.writer)
    .await
    .unwrap();
}
