// ABOUTME: HTTP route modules and the top-level router assembly
// ABOUTME: Shared request authentication and caller resolution helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! REST API routes. Each module owns one resource's endpoints and wires
//! them as an axum `Router` over the shared [`ServerResources`].

pub mod auth;
pub mod coaches;
pub mod gymnasts;
pub mod health;
pub mod trainings;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::models::{Caller, UserRole};

/// Assemble the complete API router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes(resources.clone()))
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(coaches::CoachRoutes::routes(resources.clone()))
        .merge(gymnasts::GymnastRoutes::routes(resources.clone()))
        .merge(trainings::TrainingRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Authenticate a request and resolve the acting caller
///
/// A gymnast acts under their account id directly. A coach acts under their
/// coach record id, which is looked up per request so the token stays a
/// pure account credential.
///
/// # Errors
///
/// Returns `AuthRequired`/`AuthInvalid` for credential problems and
/// `NotFound` if a coach token has no backing coach record.
pub async fn resolve_caller(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<Caller> {
    let auth = resources.auth_manager.authenticate_request(headers)?;

    match auth.role {
        UserRole::Gymnast => Ok(Caller::gymnast(auth.user_id)),
        UserRole::Coach => {
            let coach = resources
                .coaches()
                .get_by_user(auth.user_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Coach record for account {}", auth.user_id))
                })?;
            Ok(Caller::coach(coach.id))
        }
    }
}
