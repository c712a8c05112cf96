// ABOUTME: Database operations for coach records
// ABOUTME: Handles coach creation, lookup by id or owning account, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::Coach;

/// Coach database operations manager
pub struct CoachesManager {
    pool: SqlitePool,
}

impl CoachesManager {
    /// Create a new coaches manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a coach record for an account
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the account already has a coach record, or a
    /// database error otherwise.
    pub async fn create(&self, user_id: Uuid, name: &str) -> AppResult<Coach> {
        let coach = Coach {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_owned(),
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, &coach).await?;
        Ok(coach)
    }

    /// Insert a coach row on an existing connection or transaction
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the account already has a coach record, or a
    /// database error otherwise.
    pub async fn insert(conn: &mut SqliteConnection, coach: &Coach) -> AppResult<()> {
        let result = sqlx::query(
            r"
            INSERT INTO coaches (id, user_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(coach.id.to_string())
        .bind(coach.user_id.to_string())
        .bind(&coach.name)
        .bind(coach.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::conflict(
                "Account already has a coach record",
            )),
            Err(e) => Err(AppError::database(format!("Failed to create coach: {e}"))),
        }
    }

    /// Get a coach by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, coach_id: Uuid) -> AppResult<Option<Coach>> {
        let row = sqlx::query("SELECT id, user_id, name, created_at FROM coaches WHERE id = $1")
            .bind(coach_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get coach: {e}")))?;

        row.map(|r| row_to_coach(&r)).transpose()
    }

    /// Get the coach record owned by an account, if any
    ///
    /// Used to resolve a coach caller's entity identity per request.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<Coach>> {
        let row =
            sqlx::query("SELECT id, user_id, name, created_at FROM coaches WHERE user_id = $1")
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get coach by user: {e}")))?;

        row.map(|r| row_to_coach(&r)).transpose()
    }

    /// Delete a coach record
    ///
    /// Linkage rows cascade with the coach, so no gymnast is left with a
    /// dangling back-reference.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no coach exists with this id.
    pub async fn delete(&self, coach_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM coaches WHERE id = $1")
            .bind(coach_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete coach: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Coach {coach_id}")));
        }
        Ok(())
    }
}

fn row_to_coach(row: &SqliteRow) -> AppResult<Coach> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Coach {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid coach id in row: {e}")))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::database(format!("Invalid user id in row: {e}")))?,
        name: row.try_get("name")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::database(format!("Invalid created_at in row: {e}")))?
            .with_timezone(&Utc),
    })
}
