//! SQLite-backed archived-log repository.

use uuid::Uuid;

use haven_core::repository::ArchiveRepository;
use haven_types::channel::ParticipantId;
use haven_types::error::RepositoryError;
use haven_types::summary::ArchivedLog;

use super::pool::DatabasePool;
use super::summary::parse_datetime;

pub struct SqliteArchiveRepository {
    pool: DatabasePool,
}

impl SqliteArchiveRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl ArchiveRepository for SqliteArchiveRepository {
    async fn insert(&self, log: &ArchivedLog) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO archived_logs
               (id, user_id, counselor_id, channel_id, raw_key, text_key, uploaded_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(log.id.to_string())
        .bind(log.user_id)
        .bind(log.counselor_id)
        .bind(log.channel_id)
        .bind(&log.raw_key)
        .bind(&log.text_key)
        .bind(log.uploaded_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_for_counselor(
        &self,
        counselor_id: ParticipantId,
    ) -> Result<Vec<ArchivedLog>, RepositoryError> {
        let rows: Vec<(String, i64, i64, i64, String, String, String)> = sqlx::query_as(
            r#"SELECT id, user_id, counselor_id, channel_id, raw_key, text_key, uploaded_at
               FROM archived_logs WHERE counselor_id = ? ORDER BY uploaded_at DESC"#,
        )
        .bind(counselor_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut logs = Vec::with_capacity(rows.len());
        for (id, user_id, counselor_id, channel_id, raw_key, text_key, uploaded_at) in rows {
            logs.push(ArchivedLog {
                id: Uuid::parse_str(&id)
                    .map_err(|e| RepositoryError::Query(format!("invalid id: {e}")))?,
                user_id,
                counselor_id,
                channel_id,
                raw_key,
                text_key,
                uploaded_at: parse_datetime(&uploaded_at)?,
            });
        }
        Ok(logs)
    }
}
