// ABOUTME: Relationship ledger owning the coach-gymnast linkage and its consistency rules
// ABOUTME: Normalized join table queried from both directions, atomic single-statement writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! # Relationship Ledger
//!
//! Owns the coach↔gymnast linkage. The relationship is stored as one
//! normalized `coach_gymnasts` row per active link, so symmetry is
//! structural: a link observed from the coach side is by construction the
//! same row observed from the gymnast side, and a partial (one-sided) link
//! cannot exist. Duplicate links are rejected by the table's unique
//! constraint, which also resolves two concurrent `link` calls for the same
//! pair into one success and one conflict.
//!
//! The ledger never auto-creates missing entities: both ends are looked up
//! first and a missing end is reported as `NotFound` naming which entity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Coach↔gymnast linkage ledger
#[derive(Clone)]
pub struct RelationshipLedger {
    pool: SqlitePool,
}

impl RelationshipLedger {
    /// Create a new relationship ledger
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Link a coach to a gymnast
    ///
    /// Both entities must already exist. The link is written as a single
    /// INSERT, so the two directions of the relationship can never diverge.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` naming the missing entity if either end does not
    /// exist, and `Conflict` if the pair is already linked.
    pub async fn link(&self, coach_id: Uuid, gymnast_id: Uuid) -> AppResult<()> {
        self.require_entities(coach_id, gymnast_id).await?;

        let result = sqlx::query(
            r"
            INSERT INTO coach_gymnasts (coach_id, gymnast_id, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(coach_id.to_string())
        .bind(gymnast_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(%coach_id, %gymnast_id, "coach linked to gymnast");
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::conflict(
                "Gymnast is already linked to this coach",
            )),
            Err(e) => Err(AppError::database(format!("Failed to link: {e}"))),
        }
    }

    /// Unlink a coach from a gymnast
    ///
    /// A single DELETE removes the relation from both directions or neither.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the pair is not currently linked.
    pub async fn unlink(&self, coach_id: Uuid, gymnast_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM coach_gymnasts WHERE coach_id = $1 AND gymnast_id = $2",
        )
        .bind(coach_id.to_string())
        .bind(gymnast_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to unlink: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict("Gymnast is not linked to this coach"));
        }

        tracing::info!(%coach_id, %gymnast_id, "coach unlinked from gymnast");
        Ok(())
    }

    /// Check whether a coach is currently linked to a gymnast
    ///
    /// Indexed point query against the join table; never scans trainings.
    /// Evaluated fresh on every call so an unlink takes effect immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn is_linked(&self, coach_id: Uuid, gymnast_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM coach_gymnasts WHERE coach_id = $1 AND gymnast_id = $2",
        )
        .bind(coach_id.to_string())
        .bind(gymnast_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query link: {e}")))?;

        Ok(row.is_some())
    }

    /// All coaches linked to a gymnast, in link insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn coaches_of(&self, gymnast_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query(
            "SELECT coach_id FROM coach_gymnasts WHERE gymnast_id = $1 ORDER BY id",
        )
        .bind(gymnast_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list coaches: {e}")))?;

        rows.iter().map(|r| parse_id(r, "coach_id")).collect()
    }

    /// All gymnasts linked to a coach (the coach's roster), in link insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn gymnasts_of(&self, coach_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query(
            "SELECT gymnast_id FROM coach_gymnasts WHERE coach_id = $1 ORDER BY id",
        )
        .bind(coach_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list roster: {e}")))?;

        rows.iter().map(|r| parse_id(r, "gymnast_id")).collect()
    }

    /// Verify both ends of a prospective link exist, naming the missing one
    async fn require_entities(&self, coach_id: Uuid, gymnast_id: Uuid) -> AppResult<()> {
        let coach = sqlx::query("SELECT 1 FROM coaches WHERE id = $1")
            .bind(coach_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up coach: {e}")))?;
        if coach.is_none() {
            return Err(AppError::not_found(format!("Coach {coach_id}")));
        }

        let gymnast = sqlx::query("SELECT 1 FROM gymnasts WHERE user_id = $1")
            .bind(gymnast_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up gymnast: {e}")))?;
        if gymnast.is_none() {
            return Err(AppError::not_found(format!("Gymnast {gymnast_id}")));
        }

        Ok(())
    }
}

fn parse_id(row: &sqlx::sqlite::SqliteRow, column: &str) -> AppResult<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw)
        .map_err(|e| AppError::database(format!("Invalid {column} in row: {e}")))
}
