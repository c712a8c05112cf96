// ABOUTME: Registration and login endpoints issuing JWT credentials
// ABOUTME: Account creation also provisions the role-specific coach or gymnast record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! Authentication routes
//!
//! Registration creates the account row plus the matching coach or gymnast
//! record in one transaction. Login failures are reported uniformly so the
//! response never reveals whether the account exists.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ServerResources;
use crate::database::coaches::CoachesManager;
use crate::database::gymnasts::GymnastsManager;
use crate::database::users::UsersManager;
use crate::errors::AppError;
use crate::models::{Coach, Gymnast, User, UserRole};

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Unique username
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Display name
    pub name: String,
    /// Account role (`coach` or `gymnast`)
    pub role: String,
    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// Club affiliation
    pub club_name: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address
    pub username_or_email: String,
    /// Plaintext password
    pub password: String,
}

/// Response carrying a fresh token and the account it belongs to
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed JWT
    pub token: String,
    /// Authenticated account
    pub user: User,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/me", get(Self::handle_me))
            .with_state(resources)
    }

    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate_request(&headers)?;
        let user = resources
            .users()
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Account {}", auth.user_id)))?;
        Ok(Json(user).into_response())
    }

    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let role = body.role.parse::<UserRole>()?;
        if body.password.len() < 8 {
            return Err(AppError::invalid_input(
                "Password must be at least 8 characters",
            ));
        }

        let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

        let user = User {
            id: Uuid::new_v4(),
            username: body.username,
            email: body.email,
            password_hash,
            name: body.name,
            role,
            date_of_birth: body.date_of_birth,
            club_name: body.club_name,
            created_at: Utc::now(),
        };

        // Account row and role record commit together, so a failed role
        // insert never leaves an orphan account behind.
        let mut tx = resources.database.pool().begin().await?;
        UsersManager::insert(&mut tx, &user).await?;
        match user.role {
            UserRole::Coach => {
                let coach = Coach {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    name: user.name.clone(),
                    created_at: user.created_at,
                };
                CoachesManager::insert(&mut tx, &coach).await?;
            }
            UserRole::Gymnast => {
                let gymnast = Gymnast {
                    user_id: user.id,
                    username: user.username.clone(),
                    season_goals: None,
                    created_at: user.created_at,
                };
                GymnastsManager::insert(&mut tx, &gymnast).await?;
            }
        }
        tx.commit().await?;

        let token = resources.auth_manager.generate_token(&user)?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "account registered");

        Ok((StatusCode::CREATED, Json(AuthResponse { token, user })).into_response())
    }

    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .users()
            .get_by_username_or_email(&body.username_or_email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid username or password"))?;

        let valid = bcrypt::verify(&body.password, &user.password_hash)
            .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))?;
        if !valid {
            return Err(AppError::auth_invalid("Invalid username or password"));
        }

        let token = resources.auth_manager.generate_token(&user)?;
        tracing::info!(user_id = %user.id, "login succeeded");

        Ok(Json(AuthResponse { token, user }).into_response())
    }
}
