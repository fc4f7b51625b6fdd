//! SQLite-backed shared channel store.
//!
//! Implements `MembershipStore` and `TranscriptStore` from `haven-core`.
//! Membership is one row per (channel, participant) pair, so `INSERT OR
//! IGNORE` gives idempotent set-add semantics in a single statement. The
//! transcript buffer is stored as one JSON document per channel; the
//! single-connection writer pool serializes concurrent appends.

use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::Row;

use haven_core::store::{MembershipStore, TranscriptStore};
use haven_types::channel::{ChannelId, ParticipantId};
use haven_types::error::StoreError;
use haven_types::transcript::TranscriptBuffer;

use super::pool::DatabasePool;

pub struct SqliteChannelStore {
    pool: DatabasePool,
}

impl SqliteChannelStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn store_err(e: sqlx::Error) -> StoreError {
    StoreError::Operation(e.to_string())
}

impl MembershipStore for SqliteChannelStore {
    async fn join(
        &self,
        channel_id: ChannelId,
        participant_id: ParticipantId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR IGNORE INTO channel_members (channel_id, participant_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(channel_id)
        .bind(participant_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn leave(
        &self,
        channel_id: ChannelId,
        participant_id: ParticipantId,
    ) -> Result<u64, StoreError> {
        sqlx::query("DELETE FROM channel_members WHERE channel_id = ? AND participant_id = ?")
            .bind(channel_id)
            .bind(participant_id)
            .execute(&self.pool.writer)
            .await
            .map_err(store_err)?;

        let row = sqlx::query("SELECT COUNT(*) AS n FROM channel_members WHERE channel_id = ?")
            .bind(channel_id)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(store_err)?;
        let remaining: i64 = row.try_get("n").map_err(store_err)?;
        Ok(remaining as u64)
    }

    async fn members(&self, channel_id: ChannelId) -> Result<BTreeSet<ParticipantId>, StoreError> {
        let rows = sqlx::query("SELECT participant_id FROM channel_members WHERE channel_id = ?")
            .bind(channel_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(store_err)?;

        let mut members = BTreeSet::new();
        for row in &rows {
            let id: i64 = row.try_get("participant_id").map_err(store_err)?;
            members.insert(id);
        }
        Ok(members)
    }

    async fn destroy(&self, channel_id: ChannelId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM channel_members WHERE channel_id = ?")
            .bind(channel_id)
            .execute(&self.pool.writer)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

impl TranscriptStore for SqliteChannelStore {
    async fn write(&self, buffer: &TranscriptBuffer) -> Result<(), StoreError> {
        let document = serde_json::to_string(buffer)
            .map_err(|e| StoreError::Encoding(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO transcript_buffers (channel_id, document, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (channel_id) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at"#,
        )
        .bind(buffer.channel_id)
        .bind(&document)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn read(&self, channel_id: ChannelId) -> Result<Option<TranscriptBuffer>, StoreError> {
        let row = sqlx::query("SELECT document FROM transcript_buffers WHERE channel_id = ?")
            .bind(channel_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(store_err)?;

        match row {
            Some(row) => {
                let document: String = row.try_get("document").map_err(store_err)?;
                let buffer: TranscriptBuffer = serde_json::from_str(&document)
                    .map_err(|e| StoreError::Encoding(e.to_string()))?;
                Ok(Some(buffer))
            }
            None => Ok(None),
        }
    }

    async fn clear(&self, channel_id: ChannelId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM transcript_buffers WHERE channel_id = ?")
            .bind(channel_id)
            .execute(&self.pool.writer)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}
