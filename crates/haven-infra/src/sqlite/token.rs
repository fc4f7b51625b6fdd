//! Access-token storage and validation.
//!
//! Tokens are random, prefixed with `haven_`, and stored as SHA-256
//! hashes. Validation returns the identity the token was minted for;
//! unknown tokens yield `None` so the gateway can apply its lenient
//! unauthenticated-connection policy.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use haven_core::identity::IdentityValidator;
use haven_types::channel::ParticipantId;
use haven_types::error::RepositoryError;
use haven_types::identity::{Identity, Role};

use super::pool::DatabasePool;

/// Lowercase-hex SHA-256 of a token.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

pub struct SqliteTokenValidator {
    pool: DatabasePool,
}

impl SqliteTokenValidator {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Mint a new token for a participant and store its hash. Returns the
    /// plaintext token; it is shown once and never stored.
    pub async fn mint(
        &self,
        subject_id: ParticipantId,
        role: Role,
    ) -> Result<String, RepositoryError> {
        let mut token_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut token_bytes);
        let token = format!(
            "haven_{}",
            token_bytes
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<String>()
        );

        sqlx::query(
            "INSERT INTO access_tokens (id, token_hash, subject_id, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(hash_token(&token))
        .bind(subject_id)
        .bind(role.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(token)
    }
}

impl IdentityValidator for SqliteTokenValidator {
    async fn validate(&self, token: &str) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query("SELECT id, subject_id, role FROM access_tokens WHERE token_hash = ?")
            .bind(hash_token(token))
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row
            .try_get("id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let subject_id: i64 = row
            .try_get("subject_id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let role: String = row
            .try_get("role")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let role = role.parse::<Role>().map_err(RepositoryError::Query)?;

        // Best effort; a failed bookkeeping update never fails validation.
        let _ = sqlx::query("UPDATE access_tokens SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(&id)
            .execute(&self.pool.writer)
            .await;

        Ok(Some(Identity { subject_id, role }))
    }
}
