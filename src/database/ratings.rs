//! Rating persistence and per-user aggregation.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Rating, RatingCreateRequest, UserRatingSummary};

fn map_rating_row(row: &SqliteRow) -> AppResult<Rating> {
    Ok(Rating {
        id: Uuid::parse_str(&row.get::<String, _>("id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        request_id: Uuid::parse_str(&row.get::<String, _>("request_id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        rater_id: Uuid::parse_str(&row.get::<String, _>("rater_id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        rated_id: Uuid::parse_str(&row.get::<String, _>("rated_id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        stars: row.get("stars"),
        comment: row.get("comment"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

impl Database {
    pub async fn create_rating(&self, request: &RatingCreateRequest) -> AppResult<Rating> {
        let rating = Rating {
            id: Uuid::new_v4(),
            request_id: request.request_id,
            rater_id: request.rater_id,
            rated_id: request.rated_id,
            stars: request.stars,
            comment: request.comment.clone(),
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO ratings (id, request_id, rater_id, rated_id, stars, comment, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rating.id.to_string())
        .bind(rating.request_id.to_string())
        .bind(rating.rater_id.to_string())
        .bind(rating.rated_id.to_string())
        .bind(rating.stars)
        .bind(&rating.comment)
        .bind(rating.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(rating),
            Err(sqlx::Error::Database(e)) if e.message().contains("UNIQUE") => Err(
                AppError::conflict("this request was already rated by this user"),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Ratings received by a user, newest first, plus the running average.
    pub async fn get_user_ratings(&self, user_id: Uuid) -> AppResult<UserRatingSummary> {
        let rows = sqlx::query(
            "SELECT * FROM ratings WHERE rated_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let ratings: Vec<Rating> = rows.iter().map(map_rating_row).collect::<AppResult<_>>()?;

        let rating_count = ratings.len() as i64;
        let average_stars = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().map(|r| r.stars as f64).sum::<f64>() / rating_count as f64)
        };

        Ok(UserRatingSummary {
            user_id,
            average_stars,
            rating_count,
            ratings,
        })
    }
}
