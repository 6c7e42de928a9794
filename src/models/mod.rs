use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub city: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role arrives as a free string so callers may use either vocabulary
/// (`transporteur` or the legacy `transporter`); it is normalized at the
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreateRequest {
    pub name: String,
    pub phone: String,
    pub role: String,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Assigned,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Open => "open",
            RequestStatus::Assigned => "assigned",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(RequestStatus::Open),
            "assigned" => Some(RequestStatus::Assigned),
            "completed" => Some(RequestStatus::Completed),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportRequest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub from_city: String,
    pub to_city: String,
    pub departure_address: Option<String>,
    pub arrival_address: Option<String>,
    pub goods_description: String,
    pub status: RequestStatus,
    /// Best-effort road distance; `None` means "unknown", never an error.
    pub distance_km: Option<u32>,
    pub distance_source: Option<DistanceSource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportRequestCreateRequest {
    pub client_id: Uuid,
    pub from_city: String,
    pub to_city: String,
    pub departure_address: Option<String>,
    pub arrival_address: Option<String>,
    pub goods_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportRequestUpdateRequest {
    pub goods_description: Option<String>,
    pub departure_address: Option<String>,
    pub arrival_address: Option<String>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OfferStatus::Pending),
            "accepted" => Some(OfferStatus::Accepted),
            "rejected" => Some(OfferStatus::Rejected),
            "withdrawn" => Some(OfferStatus::Withdrawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub request_id: Uuid,
    pub transporteur_id: Uuid,
    /// Price in Moroccan dirhams.
    pub price_mad: i64,
    pub message: Option<String>,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCreateRequest {
    pub transporteur_id: Uuid,
    pub price_mad: i64,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub request_id: Uuid,
    pub rater_id: Uuid,
    pub rated_id: Uuid,
    pub stars: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingCreateRequest {
    pub request_id: Uuid,
    pub rater_id: Uuid,
    pub rated_id: Uuid,
    pub stars: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRatingSummary {
    pub user_id: Uuid,
    pub average_stars: Option<f64>,
    pub rating_count: i64,
    pub ratings: Vec<Rating>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewRequest,
    NewOffer,
    OfferAccepted,
    OfferRejected,
    RequestCompleted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewRequest => "new_request",
            NotificationKind::NewOffer => "new_offer",
            NotificationKind::OfferAccepted => "offer_accepted",
            NotificationKind::OfferRejected => "offer_rejected",
            NotificationKind::RequestCompleted => "request_completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new_request" => Some(NotificationKind::NewRequest),
            "new_offer" => Some(NotificationKind::NewOffer),
            "offer_accepted" => Some(NotificationKind::OfferAccepted),
            "offer_rejected" => Some(NotificationKind::OfferRejected),
            "request_completed" => Some(NotificationKind::RequestCompleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Which routing level produced a distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceSource {
    Address,
    City,
}

impl DistanceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceSource::Address => "address",
            DistanceSource::City => "city",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "address" => Some(DistanceSource::Address),
            "city" => Some(DistanceSource::City),
            _ => None,
        }
    }
}

/// Input to the distance resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceQuery {
    pub from_city: String,
    pub to_city: String,
    pub departure_address: Option<String>,
    pub arrival_address: Option<String>,
    /// Correlation id carried through log lines (usually the transport
    /// request id).
    pub reference_id: Option<String>,
}

/// Outcome of a distance resolution. A failed resolution carries
/// `distance_km: None` plus a reason string; it is never an HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceResolution {
    pub distance_km: Option<u32>,
    pub source: Option<DistanceSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub was_cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DistanceResolution {
    pub fn failure(reason: impl ToString) -> Self {
        Self {
            distance_km: None,
            source: None,
            was_cached: None,
            error: Some(reason.to_string()),
        }
    }
}
