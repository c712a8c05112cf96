// ABOUTME: Database operations for training records
// ABOUTME: Point lookups, date-ordered listings, and transactional exercise mutations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! Training record storage
//!
//! Every mutation is applied as a single atomic read-modify-write keyed by
//! the training id: status and location updates are one UPDATE statement,
//! while field merges and exercise mutations run inside an immediate
//! transaction. Taking the write lock before the read means two concurrent
//! mutations of one training queue on the busy handler instead of failing a
//! deferred lock upgrade.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Exercise, Location, Training, TrainingStatus};

/// Caller-supplied partial update of a training's mutable scalar fields
///
/// `gymnast_id`, `status`, and `exercises` are deliberately absent; they
/// have dedicated operations (or, for `gymnast_id`, none at all).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingFieldsUpdate {
    /// New session date
    pub date: Option<DateTime<Utc>>,
    /// New session location
    pub location: Option<Location>,
}

/// Single exercise status update, matched by name
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseStatusUpdate {
    /// Name of the exercise to update
    pub name: String,
    /// New completion value
    pub completed: bool,
}

/// Training database operations manager
pub struct TrainingsManager {
    pool: SqlitePool,
}

impl TrainingsManager {
    /// Create a new trainings manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new training record
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, training: &Training) -> AppResult<()> {
        let exercises_json = serde_json::to_string(&training.exercises)?;

        sqlx::query(
            r"
            INSERT INTO trainings (id, gymnast_id, coach_id, date, latitude, longitude,
                                   address, exercises, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            ",
        )
        .bind(training.id.to_string())
        .bind(training.gymnast_id.to_string())
        .bind(training.coach_id.map(|id| id.to_string()))
        .bind(training.date.to_rfc3339())
        .bind(training.location.latitude)
        .bind(training.location.longitude)
        .bind(&training.location.address)
        .bind(&exercises_json)
        .bind(training.status.as_str())
        .bind(training.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create training: {e}")))?;

        Ok(())
    }

    /// Get a training by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, training_id: Uuid) -> AppResult<Option<Training>> {
        let row = sqlx::query("SELECT * FROM trainings WHERE id = $1")
            .bind(training_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get training: {e}")))?;

        row.map(|r| row_to_training(&r)).transpose()
    }

    /// Apply a partial update of mutable scalar fields
    ///
    /// Runs as a locked read-modify-write so the merge with current values
    /// is atomic. The owning gymnast is never touched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the training does not exist.
    pub async fn update_fields(
        &self,
        training_id: Uuid,
        update: &TrainingFieldsUpdate,
    ) -> AppResult<Training> {
        self.locked_rmw(training_id, |training| {
            if let Some(date) = update.date {
                training.date = date;
            }
            if let Some(location) = update.location.clone() {
                training.location = location;
            }
            Ok(())
        })
        .await
    }

    /// Overwrite completion values of exercises matched by name
    ///
    /// Absent names are skipped without error so stale or partial client
    /// retries stay idempotent. The whole merge is one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the training does not exist.
    pub async fn update_exercise_status(
        &self,
        training_id: Uuid,
        updates: &[ExerciseStatusUpdate],
    ) -> AppResult<Training> {
        self.mutate_exercises(training_id, |exercises| {
            for update in updates {
                if let Some(exercise) = exercises.iter_mut().find(|e| e.name == update.name) {
                    exercise.completed = Some(update.completed);
                }
            }
            Ok(())
        })
        .await
    }

    /// Append exercises with not-yet-attempted completion
    ///
    /// Names must be unique within the training; a duplicate against the
    /// stored sequence or within the batch is rejected so later by-name
    /// status updates stay unambiguous.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the training does not exist and `Conflict` on a
    /// duplicate exercise name.
    pub async fn add_exercises(&self, training_id: Uuid, names: &[String]) -> AppResult<Training> {
        self.mutate_exercises(training_id, |exercises| {
            for name in names {
                if exercises.iter().any(|e| &e.name == name)
                    || names.iter().filter(|n| *n == name).count() > 1
                {
                    return Err(AppError::conflict(format!(
                        "Exercise '{name}' already exists in this training"
                    )));
                }
            }
            exercises.extend(names.iter().map(|name| Exercise {
                name: name.clone(),
                completed: None,
            }));
            Ok(())
        })
        .await
    }

    /// Overwrite the training status
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the training does not exist.
    pub async fn update_status(
        &self,
        training_id: Uuid,
        status: TrainingStatus,
    ) -> AppResult<Training> {
        let result = sqlx::query("UPDATE trainings SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(training_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update status: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Training {training_id}")));
        }

        self.get(training_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training {training_id}")))
    }

    /// Overwrite the training location
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the training does not exist.
    pub async fn update_location(
        &self,
        training_id: Uuid,
        location: &Location,
    ) -> AppResult<Training> {
        let result = sqlx::query(
            r"
            UPDATE trainings
            SET latitude = $1, longitude = $2, address = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.address)
        .bind(Utc::now().to_rfc3339())
        .bind(training_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update location: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Training {training_id}")));
        }

        self.get(training_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training {training_id}")))
    }

    /// All trainings owned by a gymnast, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_for_gymnast(&self, gymnast_id: Uuid) -> AppResult<Vec<Training>> {
        let rows = sqlx::query("SELECT * FROM trainings WHERE gymnast_id = $1 ORDER BY date DESC")
            .bind(gymnast_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list trainings: {e}")))?;

        rows.iter().map(row_to_training).collect()
    }

    /// All trainings owned by any of the given gymnasts, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_for_gymnasts(&self, gymnast_ids: &[Uuid]) -> AppResult<Vec<Training>> {
        if gymnast_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=gymnast_ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT * FROM trainings WHERE gymnast_id IN ({placeholders}) ORDER BY date DESC"
        );

        let mut q = sqlx::query(&query);
        for id in gymnast_ids {
            q = q.bind(id.to_string());
        }

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list roster trainings: {e}")))?;

        rows.iter().map(row_to_training).collect()
    }

    /// Locked read-modify-write of a training's exercise sequence
    async fn mutate_exercises<F>(&self, training_id: Uuid, mutate: F) -> AppResult<Training>
    where
        F: FnOnce(&mut Vec<Exercise>) -> AppResult<()>,
    {
        self.locked_rmw(training_id, |training| mutate(&mut training.exercises))
            .await
    }

    /// Read-modify-write of one training under an immediate transaction
    ///
    /// `BEGIN IMMEDIATE` takes the write lock before the read, so two
    /// concurrent mutations of the same training serialize on the busy
    /// handler instead of racing a deferred lock upgrade into `SQLITE_BUSY`.
    async fn locked_rmw<F>(&self, training_id: Uuid, mutate: F) -> AppResult<Training>
    where
        F: FnOnce(&mut Training) -> AppResult<()>,
    {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        match Self::apply_locked(&mut conn, training_id, mutate).await {
            Ok(training) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| AppError::database(format!("Failed to commit: {e}")))?;
                Ok(training)
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }

    async fn apply_locked<F>(
        conn: &mut SqliteConnection,
        training_id: Uuid,
        mutate: F,
    ) -> AppResult<Training>
    where
        F: FnOnce(&mut Training) -> AppResult<()>,
    {
        let row = sqlx::query("SELECT * FROM trainings WHERE id = $1")
            .bind(training_id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to get training: {e}")))?;
        let mut training =
            row.map(|r| row_to_training(&r))
                .transpose()?
                .ok_or_else(|| AppError::not_found(format!("Training {training_id}")))?;

        mutate(&mut training)?;
        training.updated_at = Utc::now();

        let exercises_json = serde_json::to_string(&training.exercises)?;
        sqlx::query(
            r"
            UPDATE trainings
            SET date = $1, latitude = $2, longitude = $3, address = $4,
                exercises = $5, updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(training.date.to_rfc3339())
        .bind(training.location.latitude)
        .bind(training.location.longitude)
        .bind(&training.location.address)
        .bind(&exercises_json)
        .bind(training.updated_at.to_rfc3339())
        .bind(training_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update training: {e}")))?;

        Ok(training)
    }
}

fn row_to_training(row: &SqliteRow) -> AppResult<Training> {
    let id: String = row.try_get("id")?;
    let gymnast_id: String = row.try_get("gymnast_id")?;
    let coach_id: Option<String> = row.try_get("coach_id")?;
    let date: String = row.try_get("date")?;
    let exercises_json: String = row.try_get("exercises")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Training {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid training id in row: {e}")))?,
        gymnast_id: Uuid::parse_str(&gymnast_id)
            .map_err(|e| AppError::database(format!("Invalid gymnast id in row: {e}")))?,
        coach_id: coach_id
            .map(|c| {
                Uuid::parse_str(&c)
                    .map_err(|e| AppError::database(format!("Invalid coach id in row: {e}")))
            })
            .transpose()?,
        date: parse_timestamp(&date)?,
        location: Location {
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            address: row.try_get("address")?,
        },
        exercises: serde_json::from_str(&exercises_json)
            .map_err(|e| AppError::database(format!("Invalid exercises in row: {e}")))?,
        status: TrainingStatus::parse_stored(&status),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp in row: {e}")))
}
