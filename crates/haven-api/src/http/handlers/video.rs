//! Video session endpoints.
//!
//! Session creation is driven over REST rather than the signaling socket
//! so clients can set up media before announcing themselves on the
//! channel. Both endpoints are keyed by channel id; the provider owns
//! the session registry.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use haven_core::video::VideoSessions;
use haven_types::channel::ChannelId;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/v1/channels/{id}/video/session - create (or fetch) the
/// channel's video session.
pub async fn create_session(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
) -> Result<Json<SessionResponse>, AppError> {
    let session_id = state.video.ensure_session(channel_id).await?;
    Ok(Json(SessionResponse { session_id }))
}

/// POST /api/v1/channels/{id}/video/token - mint a join token for the
/// channel's active session. 404 when no session exists.
pub async fn create_token(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.video.create_token(channel_id).await?;
    Ok(Json(TokenResponse { token }))
}
