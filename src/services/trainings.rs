// ABOUTME: Training lifecycle service gating every record operation behind the access policy
// ABOUTME: Creation, partial updates, exercise mutations, status transitions, and roster feeds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! # Training Lifecycle
//!
//! Business logic for training records. Every operation re-checks the
//! authorization policy against the training's stored owner before touching
//! storage, never against caller-supplied ids and never from a cached
//! decision.
//!
//! Status state machine: records are created as `scheduled`; `completed` and
//! `missed` are reached only through an explicit authorized status update.
//! Nothing transitions automatically when the session date passes.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::gymnasts::GymnastsManager;
use crate::database::relationships::RelationshipLedger;
use crate::database::trainings::{ExerciseStatusUpdate, TrainingFieldsUpdate, TrainingsManager};
use crate::errors::{AppError, AppResult};
use crate::models::{
    Caller, Exercise, Location, Training, TrainingStatus, TrainingWithGymnast,
};
use crate::permissions::AccessPolicy;

/// Request to create a training session
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrainingRequest {
    /// Owning gymnast
    pub gymnast_id: Uuid,
    /// Scheduling coach, if any
    pub coach_id: Option<Uuid>,
    /// When the session takes place
    pub date: DateTime<Utc>,
    /// Where the session takes place
    pub location: Location,
    /// Names of the planned exercises
    #[serde(default)]
    pub exercises: Vec<String>,
}

/// Training lifecycle service
pub struct TrainingService {
    trainings: TrainingsManager,
    gymnasts: GymnastsManager,
    ledger: RelationshipLedger,
    policy: AccessPolicy,
}

impl TrainingService {
    /// Create a training service over the shared managers
    #[must_use]
    pub const fn new(
        trainings: TrainingsManager,
        gymnasts: GymnastsManager,
        ledger: RelationshipLedger,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            trainings,
            gymnasts,
            ledger,
            policy,
        }
    }

    /// Create a training session for a gymnast
    ///
    /// Exercises named here are part of the original session plan and seed
    /// as `completed = false` (attempted-and-pending), distinct from the
    /// `completed = null` seeding of exercises added later.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the gymnast does not exist, `Forbidden` if the
    /// caller may not create for this gymnast, and `Conflict` on duplicate
    /// exercise names in the plan.
    pub async fn create(
        &self,
        caller: &Caller,
        request: CreateTrainingRequest,
    ) -> AppResult<Training> {
        if self.gymnasts.get(request.gymnast_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Gymnast {}",
                request.gymnast_id
            )));
        }
        self.policy
            .authorize_gymnast_data(caller, request.gymnast_id)
            .await?;

        for name in &request.exercises {
            if request.exercises.iter().filter(|n| *n == name).count() > 1 {
                return Err(AppError::conflict(format!(
                    "Exercise '{name}' appears more than once in the plan"
                )));
            }
        }

        let now = Utc::now();
        let training = Training {
            id: Uuid::new_v4(),
            gymnast_id: request.gymnast_id,
            coach_id: request.coach_id,
            date: request.date,
            location: request.location,
            exercises: request
                .exercises
                .into_iter()
                .map(|name| Exercise {
                    name,
                    completed: Some(false),
                })
                .collect(),
            status: TrainingStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        self.trainings.insert(&training).await?;
        tracing::info!(training_id = %training.id, gymnast_id = %training.gymnast_id, "training created");
        Ok(training)
    }

    /// Read a training
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent and `Forbidden` if the caller has no
    /// right to the owning gymnast's data.
    pub async fn read(&self, caller: &Caller, training_id: Uuid) -> AppResult<Training> {
        let training = self.require(training_id).await?;
        self.policy
            .authorize_gymnast_data(caller, training.gymnast_id)
            .await?;
        Ok(training)
    }

    /// Partial update of mutable scalar fields (date, location)
    ///
    /// The owning gymnast, status, and exercises are not reachable through
    /// this operation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent and `Forbidden` on authorization denial.
    pub async fn update_fields(
        &self,
        caller: &Caller,
        training_id: Uuid,
        update: TrainingFieldsUpdate,
    ) -> AppResult<Training> {
        let training = self.require(training_id).await?;
        self.policy
            .authorize_gymnast_data(caller, training.gymnast_id)
            .await?;
        self.trainings.update_fields(training_id, &update).await
    }

    /// Overwrite completion values of exercises matched by name
    ///
    /// Names not present in the training are skipped without error, keeping
    /// partial client retries idempotent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent and `Forbidden` on authorization denial.
    pub async fn update_exercise_status(
        &self,
        caller: &Caller,
        training_id: Uuid,
        updates: &[ExerciseStatusUpdate],
    ) -> AppResult<Training> {
        let training = self.require(training_id).await?;
        self.policy
            .authorize_gymnast_data(caller, training.gymnast_id)
            .await?;
        self.trainings
            .update_exercise_status(training_id, updates)
            .await
    }

    /// Append exercises to the session, seeded as not-yet-attempted
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `Forbidden` on authorization denial,
    /// and `Conflict` on a duplicate exercise name.
    pub async fn add_exercises(
        &self,
        caller: &Caller,
        training_id: Uuid,
        names: &[String],
    ) -> AppResult<Training> {
        let training = self.require(training_id).await?;
        self.policy
            .authorize_gymnast_data(caller, training.gymnast_id)
            .await?;
        self.trainings.add_exercises(training_id, names).await
    }

    /// Explicit status transition
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `Forbidden` on authorization denial,
    /// and `InvalidState` on an attempt to enter the defensive default.
    pub async fn update_status(
        &self,
        caller: &Caller,
        training_id: Uuid,
        status: TrainingStatus,
    ) -> AppResult<Training> {
        if status == TrainingStatus::Default {
            return Err(AppError::invalid_state(
                "Trainings cannot transition into the default status",
            ));
        }

        let training = self.require(training_id).await?;
        self.policy
            .authorize_gymnast_data(caller, training.gymnast_id)
            .await?;
        self.trainings.update_status(training_id, status).await
    }

    /// Overwrite the session location
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent and `Forbidden` on authorization denial.
    pub async fn update_location(
        &self,
        caller: &Caller,
        training_id: Uuid,
        location: Location,
    ) -> AppResult<Training> {
        let training = self.require(training_id).await?;
        self.policy
            .authorize_gymnast_data(caller, training.gymnast_id)
            .await?;
        self.trainings.update_location(training_id, &location).await
    }

    /// All trainings owned by a gymnast, newest first
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the caller may not read this gymnast's data.
    pub async fn list_for_owner(
        &self,
        caller: &Caller,
        gymnast_id: Uuid,
    ) -> AppResult<Vec<Training>> {
        self.policy
            .authorize_gymnast_data(caller, gymnast_id)
            .await?;
        self.trainings.list_for_gymnast(gymnast_id).await
    }

    /// Feed of all trainings across a coach's roster, newest first
    ///
    /// The caller IS the coach by construction of the call site, so there is
    /// no per-gymnast authorization check here. Each training is annotated
    /// with the owning gymnast's username for presentation. An empty roster
    /// yields an empty feed, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage operation fails.
    pub async fn list_for_coach_roster(
        &self,
        coach_id: Uuid,
    ) -> AppResult<Vec<TrainingWithGymnast>> {
        let roster = self.ledger.gymnasts_of(coach_id).await?;
        if roster.is_empty() {
            return Ok(Vec::new());
        }

        let mut usernames = std::collections::HashMap::new();
        for gymnast_id in &roster {
            if let Some(gymnast) = self.gymnasts.get(*gymnast_id).await? {
                usernames.insert(*gymnast_id, gymnast.username);
            }
        }

        let trainings = self.trainings.list_for_gymnasts(&roster).await?;
        Ok(trainings
            .into_iter()
            .map(|training| {
                let gymnast_username = usernames
                    .get(&training.gymnast_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown gymnast".to_owned());
                TrainingWithGymnast {
                    training,
                    gymnast_username,
                }
            })
            .collect())
    }

    async fn require(&self, training_id: Uuid) -> AppResult<Training> {
        self.trainings
            .get(training_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training {training_id}")))
    }
}
