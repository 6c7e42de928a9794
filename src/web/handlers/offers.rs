use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::models::{Offer, OfferCreateRequest};
use crate::web::{error_status, AppState};

/// Who is performing an accept/withdraw. There is no session layer; the
/// acting user travels in the payload and ownership is checked against it.
#[derive(Debug, Deserialize)]
pub struct ActingUser {
    pub user_id: Uuid,
}

pub async fn list_offers(
    Path(request_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Offer>>, StatusCode> {
    match state.database.list_offers_for_request(request_id).await {
        Ok(offers) => Ok(Json(offers)),
        Err(e) => {
            error!("Failed to list offers for request ({}): {}", request_id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn create_offer(
    Path(request_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<OfferCreateRequest>,
) -> Result<(StatusCode, Json<Offer>), StatusCode> {
    match state.offer_service.place(request_id, payload).await {
        Ok(offer) => Ok((StatusCode::CREATED, Json(offer))),
        Err(e) => {
            error!("Failed to place offer on request ({}): {}", request_id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn accept_offer(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(acting): Json<ActingUser>,
) -> Result<Json<Offer>, StatusCode> {
    match state.offer_service.accept(id, acting.user_id).await {
        Ok(offer) => Ok(Json(offer)),
        Err(e) => {
            error!("Failed to accept offer ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn withdraw_offer(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(acting): Json<ActingUser>,
) -> Result<Json<Offer>, StatusCode> {
    match state.offer_service.withdraw(id, acting.user_id).await {
        Ok(offer) => Ok(Json(offer)),
        Err(e) => {
            error!("Failed to withdraw offer ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}
