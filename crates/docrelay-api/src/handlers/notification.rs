//! Notification handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use validator::Validate;

use docrelay_core::error::AppError;
use docrelay_core::types::UserId;
use docrelay_realtime::notification::{DisplayNotification, PushMode};

use crate::dto::request::CreateNotificationRequest;
use crate::dto::response::{ApiResponse, MarkAllReadResponse};
use crate::error::ApiError;
use crate::state::AppState;

fn user_from_path(raw: String) -> Result<UserId, ApiError> {
    let user_id = UserId::new(raw);
    if user_id.is_blank() {
        return Err(AppError::validation("user id is required").into());
    }
    Ok(user_id)
}

/// GET /api/notifications/{user_id}
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<DisplayNotification>>>, ApiError> {
    let user_id = user_from_path(user_id)?;
    let feed = state.realtime.notifications.feed(&user_id).await?;
    Ok(Json(ApiResponse::ok(feed)))
}

/// POST /api/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DisplayNotification>>), ApiError> {
    req.validate()?;
    let mode = if req.push_item {
        PushMode::Item
    } else {
        PushMode::Feed
    };

    let service = &state.realtime.notifications;
    let created = service
        .create_with(req.into_new_notification(), mode)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(service.render(&created)))))
}

/// PUT /api/notifications/{user_id}/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<MarkAllReadResponse>>, ApiError> {
    let user_id = user_from_path(user_id)?;
    let marked = state.realtime.notifications.mark_all_read(&user_id).await?;
    Ok(Json(ApiResponse::ok(MarkAllReadResponse { marked })))
}
