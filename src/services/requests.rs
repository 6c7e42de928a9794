//! Transport request intake and lifecycle.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::distance::DistanceResolver;
use crate::errors::{AppError, AppResult};
use crate::models::{
    DistanceQuery, NotificationKind, RequestStatus, TransportRequest,
    TransportRequestCreateRequest, TransportRequestUpdateRequest,
};
use crate::roles::Role;
use crate::services::NotificationService;

#[derive(Clone)]
pub struct RequestService {
    database: Database,
    resolver: Arc<DistanceResolver>,
    notifications: NotificationService,
}

impl RequestService {
    pub fn new(
        database: Database,
        resolver: Arc<DistanceResolver>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            database,
            resolver,
            notifications,
        }
    }

    /// Create a request: validate, resolve the road distance best-effort,
    /// persist, then notify coordinators. A failed distance resolution is
    /// stored as "unknown", never rejected.
    pub async fn create(
        &self,
        request: TransportRequestCreateRequest,
    ) -> AppResult<TransportRequest> {
        if request.from_city.trim().is_empty() {
            return Err(AppError::validation("from_city is required"));
        }
        if request.to_city.trim().is_empty() {
            return Err(AppError::validation("to_city is required"));
        }
        if request.goods_description.trim().is_empty() {
            return Err(AppError::validation("goods_description is required"));
        }

        let client = self
            .database
            .get_user(request.client_id)
            .await?
            .ok_or_else(|| AppError::not_found("user", request.client_id.to_string()))?;
        if client.role != Role::Client {
            return Err(AppError::permission_denied(
                "create transport request",
                "non-client user",
            ));
        }

        let id = Uuid::new_v4();
        let distance = self
            .resolver
            .resolve(&DistanceQuery {
                from_city: request.from_city.clone(),
                to_city: request.to_city.clone(),
                departure_address: request.departure_address.clone(),
                arrival_address: request.arrival_address.clone(),
                reference_id: Some(id.to_string()),
            })
            .await;

        let record = self
            .database
            .create_transport_request(&request, id, &distance)
            .await?;

        info!(
            request_id = %record.id,
            from = %record.from_city,
            to = %record.to_city,
            distance_km = ?record.distance_km,
            "Transport request created"
        );

        let body = format!(
            "Nouvelle demande de transport: {} -> {}",
            record.from_city, record.to_city
        );
        // The request already exists; a failed fan-out must not undo it.
        if let Err(e) = self
            .notifications
            .notify_role(Role::Coordinator, NotificationKind::NewRequest, &body)
            .await
        {
            warn!(request_id = %record.id, error = %e, "Coordinator fan-out failed");
        }

        Ok(record)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: TransportRequestUpdateRequest,
    ) -> AppResult<TransportRequest> {
        let existing = self
            .database
            .get_transport_request(id)
            .await?
            .ok_or_else(|| AppError::not_found("transport_request", id.to_string()))?;

        if let Some(new_status) = request.status {
            if !status_transition_allowed(existing.status, new_status) {
                return Err(AppError::conflict(format!(
                    "cannot move request from {} to {}",
                    existing.status.as_str(),
                    new_status.as_str()
                )));
            }
        }

        let updated = self
            .database
            .update_transport_request(id, &request)
            .await?
            .ok_or_else(|| AppError::not_found("transport_request", id.to_string()))?;

        if updated.status == RequestStatus::Completed && existing.status != RequestStatus::Completed
        {
            let body = format!(
                "Transport terminé: {} -> {}",
                updated.from_city, updated.to_city
            );
            self.notifications
                .notify(updated.client_id, NotificationKind::RequestCompleted, &body)
                .await;
        }

        Ok(updated)
    }
}

/// Legal lifecycle moves for a transport request.
fn status_transition_allowed(from: RequestStatus, to: RequestStatus) -> bool {
    use RequestStatus::*;
    match (from, to) {
        (a, b) if a == b => true,
        (Open, Assigned) | (Open, Cancelled) => true,
        (Assigned, Completed) | (Assigned, Cancelled) => true,
        _ => false,
    }
}
