// ABOUTME: Database operations for gymnast records
// ABOUTME: Handles gymnast creation, lookup, season goals, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::Gymnast;

/// Gymnast database operations manager
pub struct GymnastsManager {
    pool: SqlitePool,
}

impl GymnastsManager {
    /// Create a new gymnasts manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a gymnast record for an account
    ///
    /// The gymnast's primary key is the owning account id.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the account already has a gymnast record or the
    /// username is taken, or a database error otherwise.
    pub async fn create(&self, user_id: Uuid, username: &str) -> AppResult<Gymnast> {
        let gymnast = Gymnast {
            user_id,
            username: username.to_owned(),
            season_goals: None,
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, &gymnast).await?;
        Ok(gymnast)
    }

    /// Insert a gymnast row on an existing connection or transaction
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the account already has a gymnast record or the
    /// username is taken, or a database error otherwise.
    pub async fn insert(conn: &mut SqliteConnection, gymnast: &Gymnast) -> AppResult<()> {
        let result = sqlx::query(
            r"
            INSERT INTO gymnasts (user_id, username, season_goals, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(gymnast.user_id.to_string())
        .bind(&gymnast.username)
        .bind(gymnast.season_goals.as_deref())
        .bind(gymnast.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::conflict(
                "Account already has a gymnast record or username is taken",
            )),
            Err(e) => Err(AppError::database(format!("Failed to create gymnast: {e}"))),
        }
    }

    /// Get a gymnast by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, gymnast_id: Uuid) -> AppResult<Option<Gymnast>> {
        let row = sqlx::query(
            "SELECT user_id, username, season_goals, created_at FROM gymnasts WHERE user_id = $1",
        )
        .bind(gymnast_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get gymnast: {e}")))?;

        row.map(|r| row_to_gymnast(&r)).transpose()
    }

    /// Overwrite a gymnast's season goals
    ///
    /// Authorization is enforced by the caller; this is a storage-level
    /// atomic single-record update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no gymnast exists with this id.
    pub async fn update_season_goals(&self, gymnast_id: Uuid, goals: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE gymnasts SET season_goals = $1 WHERE user_id = $2")
            .bind(goals)
            .bind(gymnast_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update season goals: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Gymnast {gymnast_id}")));
        }
        Ok(())
    }

    /// Delete a gymnast record
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no gymnast exists with this id.
    pub async fn delete(&self, gymnast_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM gymnasts WHERE user_id = $1")
            .bind(gymnast_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete gymnast: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Gymnast {gymnast_id}")));
        }
        Ok(())
    }
}

fn row_to_gymnast(row: &SqliteRow) -> AppResult<Gymnast> {
    let user_id: String = row.try_get("user_id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Gymnast {
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::database(format!("Invalid gymnast id in row: {e}")))?,
        username: row.try_get("username")?,
        season_goals: row.try_get("season_goals")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::database(format!("Invalid created_at in row: {e}")))?
            .with_timezone(&Utc),
    })
}
