use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::models::{
    RequestStatus, TransportRequest, TransportRequestCreateRequest, TransportRequestUpdateRequest,
};
use crate::web::{error_status, AppState};

#[derive(Debug, Deserialize)]
pub struct RequestListParams {
    pub status: Option<String>,
    pub from_city: Option<String>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(params): Query<RequestListParams>,
) -> Result<Json<Vec<TransportRequest>>, StatusCode> {
    let status = match params.status.as_deref() {
        Some(raw) => match RequestStatus::parse(raw) {
            Some(status) => Some(status),
            None => return Err(StatusCode::BAD_REQUEST),
        },
        None => None,
    };

    match state
        .database
        .list_transport_requests(status, params.from_city.as_deref())
        .await
    {
        Ok(requests) => Ok(Json(requests)),
        Err(e) => {
            error!("Failed to list transport requests: {}", e);
            Err(error_status(&e))
        }
    }
}

pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<TransportRequestCreateRequest>,
) -> Result<(StatusCode, Json<TransportRequest>), StatusCode> {
    match state.request_service.create(payload).await {
        Ok(request) => Ok((StatusCode::CREATED, Json(request))),
        Err(e) => {
            error!("Failed to create transport request: {}", e);
            Err(error_status(&e))
        }
    }
}

pub async fn get_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<TransportRequest>, StatusCode> {
    match state.database.get_transport_request(id).await {
        Ok(Some(request)) => Ok(Json(request)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to get transport request ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn update_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<TransportRequestUpdateRequest>,
) -> Result<Json<TransportRequest>, StatusCode> {
    match state.request_service.update(id, payload).await {
        Ok(request) => Ok(Json(request)),
        Err(e) => {
            error!("Failed to update transport request ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}

pub async fn delete_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, StatusCode> {
    match state.database.delete_transport_request(id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to delete transport request ({}): {}", id, e);
            Err(error_status(&e))
        }
    }
}
