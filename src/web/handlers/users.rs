use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::error;
use uuid::Uuid;

use crate::models::{User, UserCreateRequest, UserUpdateRequest};
use crate::web::{error_status, AppState};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, StatusCode> {
    match state.database.list_users().await {
        Ok(users) => Ok(Json(users)),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(error_status(&e))
        }
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCreateRequest>,
) -> Result<(StatusCode, Json<User>), StatusCode> {
    match state.database.create_user(&payload).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(error_status(&e))
        }
    }
}

pub async fn get_user(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<User>, StatusCode> {
    match state.database.get_user(id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to get user ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn update_user(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<User>, StatusCode> {
    match state.database.update_user(id, &payload).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to update user ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn delete_user(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, StatusCode> {
    match state.database.delete_user(id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to delete user ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}
