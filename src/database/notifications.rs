//! Notification persistence.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Notification, NotificationKind};

fn map_notification_row(row: &SqliteRow) -> AppResult<Notification> {
    let kind_str: String = row.get("kind");
    let kind = NotificationKind::parse(&kind_str).ok_or_else(|| {
        AppError::internal(format!("unknown kind '{}' in notifications table", kind_str))
    })?;

    Ok(Notification {
        id: Uuid::parse_str(&row.get::<String, _>("id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        user_id: Uuid::parse_str(&row.get::<String, _>("user_id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        kind,
        body: row.get("body"),
        is_read: row.get("is_read"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

impl Database {
    pub async fn create_notification(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        body: &str,
    ) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            kind,
            body: body.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, body, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(notification.id.to_string())
        .bind(notification.user_id.to_string())
        .bind(notification.kind.as_str())
        .bind(&notification.body)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn list_notifications_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_notification_row).collect()
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
