use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::error;
use uuid::Uuid;

use crate::models::Notification;
use crate::web::{error_status, AppState};

pub async fn list_notifications(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, StatusCode> {
    match state.database.list_notifications_for_user(user_id).await {
        Ok(notifications) => Ok(Json(notifications)),
        Err(e) => {
            error!("Failed to list notifications for user ({}): {}", user_id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn mark_read(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, StatusCode> {
    match state.database.mark_notification_read(id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to mark notification read ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}
