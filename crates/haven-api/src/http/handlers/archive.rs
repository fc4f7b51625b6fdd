//! Counselor-facing listings: archived transcripts and summaries.

use axum::extract::{Path, State};
use axum::Json;

use haven_core::repository::ArchiveRepository;
use haven_types::channel::ParticipantId;
use haven_types::summary::{ArchivedLog, SummaryRecord};

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/v1/counselors/{id}/archives - a counselor's archived
/// transcripts, newest first.
pub async fn list_archives(
    State(state): State<AppState>,
    Path(counselor_id): Path<ParticipantId>,
) -> Result<Json<Vec<ArchivedLog>>, AppError> {
    let logs = state.archives.list_for_counselor(counselor_id).await?;
    Ok(Json(logs))
}

/// GET /api/v1/counselors/{id}/summaries - a counselor's persisted
/// summaries, newest first.
pub async fn list_summaries(
    State(state): State<AppState>,
    Path(counselor_id): Path<ParticipantId>,
) -> Result<Json<Vec<SummaryRecord>>, AppError> {
    let records = state.summaries.list_for_counselor(counselor_id).await?;
    Ok(Json(records))
}
