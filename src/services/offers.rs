//! Offer placement, acceptance and withdrawal.

use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    NotificationKind, Offer, OfferCreateRequest, OfferStatus, RequestStatus,
};
use crate::roles::Role;
use crate::services::NotificationService;

#[derive(Clone)]
pub struct OfferService {
    database: Database,
    notifications: NotificationService,
}

impl OfferService {
    pub fn new(database: Database, notifications: NotificationService) -> Self {
        Self {
            database,
            notifications,
        }
    }

    /// Place an offer on an open request. Only transporteurs may offer.
    pub async fn place(&self, request_id: Uuid, request: OfferCreateRequest) -> AppResult<Offer> {
        if request.price_mad <= 0 {
            return Err(AppError::validation("price_mad must be positive"));
        }

        let transport_request = self
            .database
            .get_transport_request(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("transport_request", request_id.to_string()))?;
        if transport_request.status != RequestStatus::Open {
            return Err(AppError::conflict(format!(
                "request is {}, offers are only accepted while open",
                transport_request.status.as_str()
            )));
        }

        let transporteur = self
            .database
            .get_user(request.transporteur_id)
            .await?
            .ok_or_else(|| AppError::not_found("user", request.transporteur_id.to_string()))?;
        if transporteur.role != Role::Transporteur {
            return Err(AppError::permission_denied("place offer", "non-transporteur user"));
        }

        let offer = self.database.create_offer(request_id, &request).await?;
        info!(
            offer_id = %offer.id,
            request_id = %request_id,
            price_mad = offer.price_mad,
            "Offer placed"
        );

        let body = format!(
            "Nouvelle offre de {} pour votre demande {} -> {}: {} MAD",
            transporteur.name,
            transport_request.from_city,
            transport_request.to_city,
            offer.price_mad
        );
        self.notifications
            .notify(transport_request.client_id, NotificationKind::NewOffer, &body)
            .await;

        Ok(offer)
    }

    /// Accept an offer on behalf of the request owner. Rejects pending
    /// siblings and assigns the request in the same transaction, then
    /// fans out to the winning and losing transporteurs.
    pub async fn accept(&self, offer_id: Uuid, acting_client_id: Uuid) -> AppResult<Offer> {
        let offer = self
            .database
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| AppError::not_found("offer", offer_id.to_string()))?;
        if offer.status != OfferStatus::Pending {
            return Err(AppError::conflict(format!(
                "offer is {}, only pending offers can be accepted",
                offer.status.as_str()
            )));
        }

        let transport_request = self
            .database
            .get_transport_request(offer.request_id)
            .await?
            .ok_or_else(|| AppError::not_found("transport_request", offer.request_id.to_string()))?;
        if transport_request.client_id != acting_client_id {
            return Err(AppError::permission_denied("accept offer", "request owned by another client"));
        }

        let rejected = self.database.accept_offer(&offer).await?;
        info!(
            offer_id = %offer.id,
            request_id = %offer.request_id,
            rejected = rejected.len(),
            "Offer accepted"
        );

        let route = format!(
            "{} -> {}",
            transport_request.from_city, transport_request.to_city
        );
        self.notifications
            .notify(
                offer.transporteur_id,
                NotificationKind::OfferAccepted,
                &format!("Votre offre pour {} a été acceptée", route),
            )
            .await;
        for loser in &rejected {
            self.notifications
                .notify(
                    loser.transporteur_id,
                    NotificationKind::OfferRejected,
                    &format!("Votre offre pour {} n'a pas été retenue", route),
                )
                .await;
        }

        Ok(Offer {
            status: OfferStatus::Accepted,
            ..offer
        })
    }

    /// Withdraw a pending offer; only its transporteur may do so.
    pub async fn withdraw(&self, offer_id: Uuid, acting_transporteur_id: Uuid) -> AppResult<Offer> {
        let offer = self
            .database
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| AppError::not_found("offer", offer_id.to_string()))?;
        if offer.transporteur_id != acting_transporteur_id {
            return Err(AppError::permission_denied("withdraw offer", "offer owned by another transporteur"));
        }
        if offer.status != OfferStatus::Pending {
            return Err(AppError::conflict(format!(
                "offer is {}, only pending offers can be withdrawn",
                offer.status.as_str()
            )));
        }

        self.database
            .set_offer_status(offer_id, OfferStatus::Withdrawn)
            .await?;
        info!(offer_id = %offer_id, "Offer withdrawn");

        Ok(Offer {
            status: OfferStatus::Withdrawn,
            ..offer
        })
    }
}
