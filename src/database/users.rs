//! User persistence
//!
//! This is the boundary where the legacy role vocabulary lives: rows are
//! written with [`Role::as_db_str`] and read through [`Role::from_db_str`],
//! so any spelling already present in production (`transporter`,
//! `coordinateur`) round-trips into the canonical enum. Nothing above this
//! layer sees a legacy string.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserCreateRequest, UserUpdateRequest};
use crate::roles::Role;

/// Spellings a role may carry on disk (canonical plus migration legacy).
fn db_spellings(role: Role) -> &'static [&'static str] {
    match role {
        Role::Transporteur => &["transporter", "transporteur"],
        Role::Coordinator => &["coordinator", "coordinateur"],
        Role::Client => &["client"],
        Role::Admin => &["admin"],
    }
}

fn map_user_row(row: &SqliteRow) -> AppResult<User> {
    let role_str: String = row.get("role");
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        AppError::internal(format!("unknown role '{}' in users table", role_str))
    })?;

    Ok(User {
        id: Uuid::parse_str(&row.get::<String, _>("id"))
            .map_err(|e| AppError::internal(e.to_string()))?,
        name: row.get("name"),
        phone: row.get("phone"),
        role,
        city: row.get("city"),
        is_active: row.get("is_active"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

impl Database {
    pub async fn create_user(&self, request: &UserCreateRequest) -> AppResult<User> {
        let role = Role::from_db_str(&request.role)
            .ok_or_else(|| AppError::validation(format!("unknown role '{}'", request.role)))?;

        let user = User {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            phone: request.phone.clone(),
            role,
            city: request.city.clone(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, name, phone, role, city, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.phone)
        .bind(user.role.as_db_str())
        .bind(&user.city)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(map_user_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_user_row).collect()
    }

    /// List active users holding a role, whatever spelling their rows
    /// carry.
    pub async fn list_users_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let spellings = db_spellings(role);
        let placeholders = vec!["?"; spellings.len()].join(", ");
        let sql = format!(
            "SELECT * FROM users WHERE role IN ({}) AND is_active = 1 ORDER BY created_at",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for spelling in spellings {
            query = query.bind(*spelling);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_user_row).collect()
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        request: &UserUpdateRequest,
    ) -> AppResult<Option<User>> {
        let Some(existing) = self.get_user(id).await? else {
            return Ok(None);
        };

        let name = request.name.clone().unwrap_or(existing.name);
        let phone = request.phone.clone().unwrap_or(existing.phone);
        let city = request.city.clone().or(existing.city);
        let is_active = request.is_active.unwrap_or(existing.is_active);
        let updated_at = Utc::now();

        sqlx::query(
            "UPDATE users SET name = ?, phone = ?, city = ?, is_active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&name)
        .bind(&phone)
        .bind(&city)
        .bind(is_active)
        .bind(updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(Some(User {
            name,
            phone,
            city,
            is_active,
            updated_at,
            ..existing
        }))
    }

    pub async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
