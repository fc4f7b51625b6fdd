//! SQLite-backed summary repository.

use chrono::{DateTime, NaiveDateTime, Utc};

use haven_core::repository::SummaryRepository;
use haven_types::error::RepositoryError;
use haven_types::summary::SummaryRecord;

use super::pool::DatabasePool;

const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteSummaryRepository {
    pool: DatabasePool,
}

impl SqliteSummaryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn parse_schedule(s: &str) -> Result<NaiveDateTime, RepositoryError> {
    NaiveDateTime::parse_from_str(s, SCHEDULE_FORMAT)
        .map_err(|e| RepositoryError::Query(format!("invalid next_schedule: {e}")))
}

impl SummaryRepository for SqliteSummaryRepository {
    async fn insert(&self, record: &SummaryRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO summaries
               (id, user_id, counselor_id, topic, symptoms, treatment, counselor_note, next_schedule, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id)
        .bind(record.counselor_id)
        .bind(&record.topic)
        .bind(&record.symptoms)
        .bind(&record.treatment)
        .bind(&record.counselor_note)
        .bind(
            record
                .next_schedule
                .map(|dt| dt.format(SCHEDULE_FORMAT).to_string()),
        )
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

impl SqliteSummaryRepository {
    /// Summaries written for one counselor, newest first.
    pub async fn list_for_counselor(
        &self,
        counselor_id: i64,
    ) -> Result<Vec<SummaryRecord>, RepositoryError> {
        let rows: Vec<(String, i64, i64, String, String, String, String, Option<String>, String)> =
            sqlx::query_as(
                r#"SELECT id, user_id, counselor_id, topic, symptoms, treatment, counselor_note, next_schedule, created_at
                   FROM summaries WHERE counselor_id = ? ORDER BY created_at DESC"#,
            )
            .bind(counselor_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, user_id, counselor_id, topic, symptoms, treatment, counselor_note, next_schedule, created_at) in rows {
            records.push(SummaryRecord {
                id: uuid::Uuid::parse_str(&id)
                    .map_err(|e| RepositoryError::Query(format!("invalid id: {e}")))?,
                user_id,
                counselor_id,
                topic,
                symptoms,
                treatment,
                counselor_note,
                next_schedule: next_schedule.as_deref().map(parse_schedule).transpose()?,
                created_at: parse_datetime(&created_at)?,
            });
        }
        Ok(records)
    }
}
