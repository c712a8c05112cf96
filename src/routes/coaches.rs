// ABOUTME: Route handlers for coach records and their gymnast relationships
// ABOUTME: Link/unlink management and roster listing, restricted to the owning coach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! Coach routes
//!
//! Relationship management is self-service: a coach may only operate on
//! their own roster, so every mutating endpoint checks the authenticated
//! coach against the path id before delegating.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::{Caller, UserRole};
use crate::routes::resolve_caller;

/// Coach routes handler
pub struct CoachRoutes;

impl CoachRoutes {
    /// Create all coach routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/coaches/:id", get(Self::handle_get))
            .route("/api/coaches/:id", delete(Self::handle_delete))
            .route("/api/coaches/:id/gymnasts", get(Self::handle_roster))
            .route(
                "/api/coaches/:id/gymnasts/:gymnast_id",
                post(Self::handle_link),
            )
            .route(
                "/api/coaches/:id/gymnasts/:gymnast_id",
                delete(Self::handle_unlink),
            )
            .with_state(resources)
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(coach_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        resolve_caller(&headers, &resources).await?;

        let coach = resources
            .coaches()
            .get(coach_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Coach {coach_id}")))?;
        Ok(Json(coach).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(coach_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        Self::require_self(&caller, coach_id)?;

        resources.coaches().delete(coach_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_roster(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(coach_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        Self::require_self(&caller, coach_id)?;

        let roster = resources.coordination_service().roster(coach_id).await?;
        Ok(Json(roster).into_response())
    }

    async fn handle_link(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((coach_id, gymnast_id)): Path<(Uuid, Uuid)>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        Self::require_self(&caller, coach_id)?;

        resources
            .coordination_service()
            .link(coach_id, gymnast_id)
            .await?;
        Ok(StatusCode::CREATED.into_response())
    }

    async fn handle_unlink(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((coach_id, gymnast_id)): Path<(Uuid, Uuid)>,
    ) -> Result<Response, AppError> {
        let caller = resolve_caller(&headers, &resources).await?;
        Self::require_self(&caller, coach_id)?;

        resources
            .coordination_service()
            .unlink(coach_id, gymnast_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Roster management is restricted to the coach it belongs to
    fn require_self(caller: &Caller, coach_id: Uuid) -> Result<(), AppError> {
        if caller.role == UserRole::Coach && caller.id == coach_id {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "You can only manage your own coaching relationships",
            ))
        }
    }
}
