//! SQLite-backed identity directory.
//!
//! Display names come from `users.nickname` for ordinary participants and
//! `counselor_profiles.display_name` for ids in the counselor range.

use sqlx::Row;

use haven_core::identity::IdentityDirectory;
use haven_types::channel::{is_counselor_id, ParticipantId};
use haven_types::error::RepositoryError;

use super::pool::DatabasePool;

pub struct SqliteDirectory {
    pool: DatabasePool,
}

impl SqliteDirectory {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn fetch_name(&self, sql: &str, id: ParticipantId) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let name: String = row
                    .try_get(0)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(name))
            }
            None => Ok(None),
        }
    }
}

impl IdentityDirectory for SqliteDirectory {
    async fn display_name(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<String>, RepositoryError> {
        if is_counselor_id(participant_id) {
            self.fetch_name(
                "SELECT display_name FROM counselor_profiles WHERE counselor_id = ?",
                participant_id,
            )
            .await
        } else {
            self.fetch_name("SELECT nickname FROM users WHERE id = ?", participant_id)
                .await
        }
    }

    async fn counselor_id_for_user(
        &self,
        user_id: ParticipantId,
    ) -> Result<Option<ParticipantId>, RepositoryError> {
        let row = sqlx::query("SELECT counselor_id FROM counselor_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let id: i64 = row
                    .try_get("counselor_id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::{insert_counselor, insert_user, test_pool};

    #[tokio::test]
    async fn user_name_comes_from_users_table() {
        let pool = test_pool().await;
        insert_user(&pool, 7, "jamie").await;
        let directory = SqliteDirectory::new(pool);

        assert_eq!(
            directory.display_name(7).await.unwrap(),
            Some("jamie".to_string())
        );
    }

    #[tokio::test]
    async fn counselor_name_comes_from_profiles() {
        let pool = test_pool().await;
        insert_counselor(&pool, 1003, 9, "Dr. Park").await;
        let directory = SqliteDirectory::new(pool);

        assert_eq!(
            directory.display_name(1003).await.unwrap(),
            Some("Dr. Park".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_participant_has_no_name() {
        let directory = SqliteDirectory::new(test_pool().await);
        assert!(directory.display_name(7).await.unwrap().is_none());
        assert!(directory.display_name(1003).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn counselor_resolution_by_user_account() {
        let pool = test_pool().await;
        insert_counselor(&pool, 1003, 9, "Dr. Park").await;
        let directory = SqliteDirectory::new(pool);

        assert_eq!(directory.counselor_id_for_user(9).await.unwrap(), Some(1003));
        assert!(directory.counselor_id_for_user(8).await.unwrap().is_none());
    }
}
