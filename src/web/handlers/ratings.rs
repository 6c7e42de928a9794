use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Rating, RatingCreateRequest, UserRatingSummary};
use crate::web::{error_status, AppState};

pub async fn create_rating(
    State(state): State<AppState>,
    Json(payload): Json<RatingCreateRequest>,
) -> Result<(StatusCode, Json<Rating>), StatusCode> {
    if !(1..=5).contains(&payload.stars) {
        let e = AppError::validation("stars must be between 1 and 5");
        error!("Failed to create rating: {}", e);
        return Err(error_status(&e));
    }

    match state.database.create_rating(&payload).await {
        Ok(rating) => Ok((StatusCode::CREATED, Json(rating))),
        Err(e) => {
            error!("Failed to create rating: {}", e);
            Err(error_status(&e))
        }
    }
}

pub async fn get_user_ratings(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<UserRatingSummary>, StatusCode> {
    match state.database.get_user_ratings(id).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            error!("Failed to get ratings for user ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}
