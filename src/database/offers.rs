//! Offer persistence, including the acceptance transaction.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Offer, OfferCreateRequest, OfferStatus, RequestStatus};

fn map_offer_row(row: &SqliteRow) -> AppResult<Offer> {
    let status_str: String = row.get("status");
    let status = OfferStatus::parse(&status_str).ok_or_else(|| {
        AppError::internal(format!("unknown status '{}' in offers table", status_str))
    })?;

    Ok(Offer {
        id: Uuid::parse_str(&row.get::<String, _>("id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        request_id: Uuid::parse_str(&row.get::<String, _>("request_id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        transporteur_id: Uuid::parse_str(&row.get::<String, _>("transporteur_id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        price_mad: row.get("price_mad"),
        message: row.get("message"),
        status,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

impl Database {
    pub async fn create_offer(
        &self,
        request_id: Uuid,
        request: &OfferCreateRequest,
    ) -> AppResult<Offer> {
        let offer = Offer {
            id: Uuid::new_v4(),
            request_id,
            transporteur_id: request.transporteur_id,
            price_mad: request.price_mad,
            message: request.message.clone(),
            status: OfferStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO offers
             (id, request_id, transporteur_id, price_mad, message, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(offer.id.to_string())
        .bind(offer.request_id.to_string())
        .bind(offer.transporteur_id.to_string())
        .bind(offer.price_mad)
        .bind(&offer.message)
        .bind(offer.status.as_str())
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(offer)
    }

    pub async fn get_offer(&self, id: Uuid) -> AppResult<Option<Offer>> {
        let row = sqlx::query("SELECT * FROM offers WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(map_offer_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_offers_for_request(&self, request_id: Uuid) -> AppResult<Vec<Offer>> {
        let rows = sqlx::query(
            "SELECT * FROM offers WHERE request_id = ? ORDER BY created_at",
        )
        .bind(request_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_offer_row).collect()
    }

    /// Accept an offer: mark it accepted, reject its pending siblings and
    /// assign the parent request, all in one transaction. Returns the
    /// rejected siblings so the caller can notify their transporteurs.
    pub async fn accept_offer(&self, offer: &Offer) -> AppResult<Vec<Offer>> {
        let now = Utc::now();
        let mut transaction = self.pool.begin().await?;

        sqlx::query("UPDATE offers SET status = ?, updated_at = ? WHERE id = ?")
            .bind(OfferStatus::Accepted.as_str())
            .bind(now)
            .bind(offer.id.to_string())
            .execute(&mut *transaction)
            .await?;

        let sibling_rows = sqlx::query(
            "SELECT * FROM offers WHERE request_id = ? AND id != ? AND status = ?",
        )
        .bind(offer.request_id.to_string())
        .bind(offer.id.to_string())
        .bind(OfferStatus::Pending.as_str())
        .fetch_all(&mut *transaction)
        .await?;

        sqlx::query(
            "UPDATE offers SET status = ?, updated_at = ?
             WHERE request_id = ? AND id != ? AND status = ?",
        )
        .bind(OfferStatus::Rejected.as_str())
        .bind(now)
        .bind(offer.request_id.to_string())
        .bind(offer.id.to_string())
        .bind(OfferStatus::Pending.as_str())
        .execute(&mut *transaction)
        .await?;

        sqlx::query("UPDATE transport_requests SET status = ?, updated_at = ? WHERE id = ?")
            .bind(RequestStatus::Assigned.as_str())
            .bind(now)
            .bind(offer.request_id.to_string())
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        sibling_rows.iter().map(map_offer_row).collect()
    }

    pub async fn set_offer_status(&self, id: Uuid, status: OfferStatus) -> AppResult<()> {
        sqlx::query("UPDATE offers SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
