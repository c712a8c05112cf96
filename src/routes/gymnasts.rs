// ABOUTME: Route handlers for gymnast records, season goals, and their coach listings
// ABOUTME: Self-service goal reading plus coach-gated goal writing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! Gymnast routes
//!
//! Record access follows the data-access policy (self or linked coach).
//! Season goals are asymmetric: the dedicated read endpoint is self-service
//! only, while the write endpoint is a coaching action on a linked gymnast.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::UserRole;
use crate::routes::resolve_caller;

/// Body for a season-goal write
#[derive(Debug, Deserialize)]
pub struct SeasonGoalRequest {
    /// Free-text goals for the season
    pub season_goals: String,
}

/// Response for a season-goal read
#[derive(Debug, Serialize)]
pub struct SeasonGoalResponse {
    /// Goals currently set, if any
    pub season_goals: Option<String>,
}

/// Gymnast routes handler
pub struct GymnastRoutes;

impl GymnastRoutes {
    /// Create all gymnast routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/gymnasts/me/season-goal",
                get(Self::handle_read_season_goal),
            )
            .route("/api/gymnasts/:id", get(Self::handle_get))
            .route("/api/gymnasts/:id", delete(Self::handle_delete))
            .route(
                "/api/gymnasts/:id/season-goals",
                put(Self::handle_write_season_goal),
            )
            .route("/api/gymnasts/:id/coaches", get(Self::handle_coaches))
            .route("/api/gymnasts/:id/trainings", get(Self::handle_trainings))
            .with_state(resources)
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(gymnast_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        resources
            .policy()
            .authorize_gymnast_data(&caller, gymnast_id)
            .await?;

        let gymnast = resources
            .gymnasts()
            .get(gymnast_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Gymnast {gymnast_id}")))?;
        Ok(Json(gymnast).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(gymnast_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        if caller.role != UserRole::Gymnast || caller.id != gymnast_id {
            return Err(AppError::forbidden("You can only delete your own record"));
        }

        resources.gymnasts().delete(gymnast_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_read_season_goal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let season_goals = resources
            .coordination_service()
            .read_season_goal(&caller, caller.id)
            .await?;
        Ok(Json(SeasonGoalResponse { season_goals }).into_response())
    }

    async fn handle_write_season_goal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(gymnast_id): Path<Uuid>,
        Json(body): Json<SeasonGoalRequest>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let gymnast = resources
            .coordination_service()
            .write_season_goal(&caller, gymnast_id, &body.season_goals)
            .await?;
        Ok(Json(gymnast).into_response())
    }

    async fn handle_coaches(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(gymnast_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        resources
            .policy()
            .authorize_gymnast_data(&caller, gymnast_id)
            .await?;

        let coaches = resources
            .coordination_service()
            .coaches_of(gymnast_id)
            .await?;
        Ok(Json(coaches).into_response())
    }

    async fn handle_trainings(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(gymnast_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        let trainings = resources
            .training_service()
            .list_for_owner(&caller, gymnast_id)
            .await?;
        Ok(Json(trainings).into_response())
    }
}
