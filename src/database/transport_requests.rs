//! Transport request persistence.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    DistanceResolution, DistanceSource, RequestStatus, TransportRequest,
    TransportRequestCreateRequest, TransportRequestUpdateRequest,
};

pub(crate) fn map_request_row(row: &SqliteRow) -> AppResult<TransportRequest> {
    let status_str: String = row.get("status");
    let status = RequestStatus::parse(&status_str).ok_or_else(|| {
        AppError::internal(format!(
            "unknown status '{}' in transport_requests table",
            status_str
        ))
    })?;

    let distance_source = row
        .get::<Option<String>, _>("distance_source")
        .as_deref()
        .and_then(DistanceSource::parse);

    Ok(TransportRequest {
        id: Uuid::parse_str(&row.get::<String, _>("id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        client_id: Uuid::parse_str(&row.get::<String, _>("client_id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        from_city: row.get("from_city"),
        to_city: row.get("to_city"),
        departure_address: row.get("departure_address"),
        arrival_address: row.get("arrival_address"),
        goods_description: row.get("goods_description"),
        status,
        distance_km: row.get::<Option<i64>, _>("distance_km").map(|v| v as u32),
        distance_source,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

impl Database {
    /// Insert a new request with its (possibly null) resolved distance.
    pub async fn create_transport_request(
        &self,
        request: &TransportRequestCreateRequest,
        id: Uuid,
        distance: &DistanceResolution,
    ) -> AppResult<TransportRequest> {
        let record = TransportRequest {
            id,
            client_id: request.client_id,
            from_city: request.from_city.trim().to_string(),
            to_city: request.to_city.trim().to_string(),
            departure_address: request.departure_address.clone(),
            arrival_address: request.arrival_address.clone(),
            goods_description: request.goods_description.clone(),
            status: RequestStatus::Open,
            distance_km: distance.distance_km,
            distance_source: distance.source,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO transport_requests
             (id, client_id, from_city, to_city, departure_address, arrival_address,
              goods_description, status, distance_km, distance_source, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.client_id.to_string())
        .bind(&record.from_city)
        .bind(&record.to_city)
        .bind(&record.departure_address)
        .bind(&record.arrival_address)
        .bind(&record.goods_description)
        .bind(record.status.as_str())
        .bind(record.distance_km.map(|v| v as i64))
        .bind(record.distance_source.map(|s| s.as_str()))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_transport_request(&self, id: Uuid) -> AppResult<Option<TransportRequest>> {
        let row = sqlx::query("SELECT * FROM transport_requests WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(map_request_row(&row)?)),
            None => Ok(None),
        }
    }

    /// List requests, optionally filtered on status and/or origin city.
    pub async fn list_transport_requests(
        &self,
        status: Option<RequestStatus>,
        from_city: Option<&str>,
    ) -> AppResult<Vec<TransportRequest>> {
        let mut sql = String::from("SELECT * FROM transport_requests WHERE 1 = 1");
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if from_city.is_some() {
            sql.push_str(" AND from_city = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        if let Some(city) = from_city {
            query = query.bind(city);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_request_row).collect()
    }

    pub async fn update_transport_request(
        &self,
        id: Uuid,
        request: &TransportRequestUpdateRequest,
    ) -> AppResult<Option<TransportRequest>> {
        let Some(existing) = self.get_transport_request(id).await? else {
            return Ok(None);
        };

        let goods_description = request
            .goods_description
            .clone()
            .unwrap_or(existing.goods_description);
        let departure_address = request
            .departure_address
            .clone()
            .or(existing.departure_address);
        let arrival_address = request.arrival_address.clone().or(existing.arrival_address);
        let status = request.status.unwrap_or(existing.status);
        let updated_at = Utc::now();

        sqlx::query(
            "UPDATE transport_requests
             SET goods_description = ?, departure_address = ?, arrival_address = ?,
                 status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&goods_description)
        .bind(&departure_address)
        .bind(&arrival_address)
        .bind(status.as_str())
        .bind(updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(Some(TransportRequest {
            goods_description,
            departure_address,
            arrival_address,
            status,
            updated_at,
            ..existing
        }))
    }

    pub async fn delete_transport_request(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM transport_requests WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
