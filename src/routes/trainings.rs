// ABOUTME: Route handlers for the training record REST surface
// ABOUTME: Creation, reads, partial updates, exercise mutations, and status transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! Training routes
//!
//! Thin HTTP translation over [`TrainingService`]; all authorization and
//! invariant checks live in the service, keyed on the stored owning gymnast.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::context::ServerResources;
use crate::database::trainings::{ExerciseStatusUpdate, TrainingFieldsUpdate};
use crate::errors::AppError;
use crate::models::{Location, TrainingStatus, UserRole};
use crate::routes::resolve_caller;
use crate::services::trainings::{CreateTrainingRequest, TrainingService};

/// Body for a status transition
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Target status (`scheduled`, `completed`, `missed`)
    pub status: String,
}

/// Body for exercise completion updates
#[derive(Debug, Deserialize)]
pub struct ExerciseStatusRequest {
    /// Per-exercise completion overwrites, matched by name
    pub exercises: Vec<ExerciseStatusUpdate>,
}

/// Body for appending exercises
#[derive(Debug, Deserialize)]
pub struct AddExercisesRequest {
    /// Names of the exercises to append
    pub exercises: Vec<String>,
}

/// Training routes handler
pub struct TrainingRoutes;

impl TrainingRoutes {
    /// Create all training routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/trainings", post(Self::handle_create))
            .route("/api/trainings/roster", get(Self::handle_roster_feed))
            .route("/api/trainings/:id", get(Self::handle_get))
            .route("/api/trainings/:id", put(Self::handle_update_fields))
            .route("/api/trainings/:id/status", put(Self::handle_update_status))
            .route(
                "/api/trainings/:id/location",
                put(Self::handle_update_location),
            )
            .route(
                "/api/trainings/:id/exercises/status",
                put(Self::handle_update_exercise_status),
            )
            .route(
                "/api/trainings/:id/exercises/add",
                put(Self::handle_add_exercises),
            )
            .with_state(resources)
    }

    fn service(resources: &Arc<ServerResources>) -> TrainingService {
        resources.training_service()
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateTrainingRequest>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let training = Self::service(&resources).create(&caller, body).await?;
        Ok((StatusCode::CREATED, Json(training)).into_response())
    }

    /// Feed of all trainings across the authenticated coach's roster
    async fn handle_roster_feed(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        if caller.role != UserRole::Coach {
            return Err(AppError::forbidden(
                "Only coaches can view a roster training feed",
            ));
        }

        let feed = Self::service(&resources)
            .list_for_coach_roster(caller.id)
            .await?;
        Ok(Json(feed).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(training_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let training = Self::service(&resources).read(&caller, training_id).await?;
        Ok(Json(training).into_response())
    }

    async fn handle_update_fields(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(training_id): Path<Uuid>,
        Json(body): Json<TrainingFieldsUpdate>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let training = Self::service(&resources)
            .update_fields(&caller, training_id, body)
            .await?;
        Ok(Json(training).into_response())
    }

    async fn handle_update_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(training_id): Path<Uuid>,
        Json(body): Json<StatusRequest>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let status = body.status.parse::<TrainingStatus>()?;
        let training = Self::service(&resources)
            .update_status(&caller, training_id, status)
            .await?;
        Ok(Json(training).into_response())
    }

    async fn handle_update_location(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(training_id): Path<Uuid>,
        Json(body): Json<Location>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let training = Self::service(&resources)
            .update_location(&caller, training_id, body)
            .await?;
        Ok(Json(training).into_response())
    }

    async fn handle_update_exercise_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(training_id): Path<Uuid>,
        Json(body): Json<ExerciseStatusRequest>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let training = Self::service(&resources)
            .update_exercise_status(&caller, training_id, &body.exercises)
            .await?;
        Ok(Json(training).into_response())
    }

    async fn handle_add_exercises(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(training_id): Path<Uuid>,
        Json(body): Json<AddExercisesRequest>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let training = Self::service(&resources)
            .add_exercises(&caller, training_id, &body.exercises)
            .await?;
        Ok(Json(training).into_response())
    }
}
