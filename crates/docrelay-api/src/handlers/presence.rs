//! Presence record handlers for the document lifecycle.

use axum::Json;
use axum::extract::{Path, State};

use docrelay_core::error::AppError;
use docrelay_core::types::DocumentId;
use docrelay_entity::presence::PresenceRecord;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// PUT /api/documents/{id}/presence
///
/// Creates an empty record unless one exists; returns the current record.
pub async fn register_presence(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PresenceRecord>>, ApiError> {
    let record = state.stores.presence.register(DocumentId(id)).await?;
    tracing::info!(document_id = id, "Presence record registered");
    Ok(Json(ApiResponse::ok(record)))
}

/// GET /api/documents/{id}/presence
pub async fn get_presence(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PresenceRecord>>, ApiError> {
    let record = state
        .stores
        .presence
        .find(DocumentId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("No presence record for document {id}")))?;
    Ok(Json(ApiResponse::ok(record)))
}
