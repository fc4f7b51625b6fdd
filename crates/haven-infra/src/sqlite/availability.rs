//! SQLite-backed counselor availability flag.

use chrono::Utc;
use sqlx::Row;

use haven_core::availability::AvailabilityStore;
use haven_types::channel::ParticipantId;
use haven_types::error::RepositoryError;
use haven_types::identity::AvailabilityStatus;

use super::pool::DatabasePool;

pub struct SqliteAvailabilityStore {
    pool: DatabasePool,
}

impl SqliteAvailabilityStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl AvailabilityStore for SqliteAvailabilityStore {
    async fn set_status(
        &self,
        counselor_id: ParticipantId,
        status: AvailabilityStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE counselor_profiles SET status = ?, updated_at = ? WHERE counselor_id = ?",
        )
        .bind(status.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(counselor_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get(
        &self,
        counselor_id: ParticipantId,
    ) -> Result<Option<AvailabilityStatus>, RepositoryError> {
        let row = sqlx::query("SELECT status FROM counselor_profiles WHERE counselor_id = ?")
            .bind(counselor_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let status: String = row
                    .try_get("status")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let status = status
                    .parse::<AvailabilityStatus>()
                    .map_err(RepositoryError::Query)?;
                Ok(Some(status))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::{insert_counselor, test_pool};

    #[tokio::test]
    async fn set_and_get_status() {
        let pool = test_pool().await;
        insert_counselor(&pool, 1003, 9, "Dr. Park").await;
        let store = SqliteAvailabilityStore::new(pool);

        assert_eq!(
            store.get(1003).await.unwrap(),
            Some(AvailabilityStatus::Available)
        );

        store
            .set_status(1003, AvailabilityStatus::Busy)
            .await
            .unwrap();
        assert_eq!(store.get(1003).await.unwrap(), Some(AvailabilityStatus::Busy));
    }

    #[tokio::test]
    async fn set_status_for_unknown_counselor_is_not_found() {
        let store = SqliteAvailabilityStore::new(test_pool().await);
        let err = store
            .set_status(404, AvailabilityStatus::Busy)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn get_unknown_counselor_is_none() {
        let store = SqliteAvailabilityStore::new(test_pool().await);
        assert!(store.get(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn any_transition_is_allowed() {
        let pool = test_pool().await;
        insert_counselor(&pool, 1003, 9, "Dr. Park").await;
        let store = SqliteAvailabilityStore::new(pool);

        store
            .set_status(1003, AvailabilityStatus::Available)
            .await
            .unwrap();
        store
            .set_status(1003, AvailabilityStatus::Available)
            .await
            .unwrap();
        assert_eq!(
            store.get(1003).await.unwrap(),
            Some(AvailabilityStatus::Available)
        );
    }
}
