// ABOUTME: JWT-based authentication for coach and gymnast accounts
// ABOUTME: Token generation, validation, and bearer-header extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! # Authentication
//!
//! Stateless JWT authentication. A token carries the account id and role;
//! routes validate it on every request and resolve the acting entity from it.

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};

/// JWT claims for an authenticated account
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    /// Account username
    pub username: String,
    /// Account role (`coach` or `gymnast`)
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Result of validating a bearer token
#[derive(Debug, Clone, Copy)]
pub struct AuthResult {
    /// Authenticated account id
    pub user_id: Uuid,
    /// Authenticated account role
    pub role: UserRole,
}

/// Token generation and validation
pub struct AuthManager {
    jwt_secret: Vec<u8>,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new auth manager with the given signing secret
    #[must_use]
    pub fn new(jwt_secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            jwt_secret: jwt_secret.to_vec(),
            token_expiry_hours,
        }
    }

    /// Generate a signed token for an account
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.jwt_secret),
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))
    }

    /// Validate a token and return the authenticated account
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` if the token is expired, malformed, or carries
    /// an unusable subject or role.
    pub fn validate_token(&self, token: &str) -> AppResult<AuthResult> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.jwt_secret),
            &validation,
        )
        .map_err(|e| AppError::auth_invalid(format!("Invalid token: {e}")))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid token subject"))?;
        let role = data
            .claims
            .role
            .parse::<UserRole>()
            .map_err(|_| AppError::auth_invalid("Invalid token role"))?;

        Ok(AuthResult { user_id, role })
    }

    /// Authenticate a request from its `Authorization: Bearer` header
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` if the header is missing and `AuthInvalid` if
    /// the token does not validate.
    pub fn authenticate_request(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let header = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::auth_required("Missing authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must use Bearer scheme"))?;

        self.validate_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::Utc;

    fn test_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "lin".to_owned(),
            email: "lin@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            name: "Lin".to_owned(),
            role,
            date_of_birth: None,
            club_name: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_round_trip_preserves_identity() {
        let manager = AuthManager::new(b"test_secret_at_least_32_bytes_long!!", 24);
        let user = test_user(UserRole::Gymnast);

        let token = manager.generate_token(&user).unwrap();
        let auth = manager.validate_token(&token).unwrap();

        assert_eq!(auth.user_id, user.id);
        assert_eq!(auth.role, UserRole::Gymnast);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = AuthManager::new(b"test_secret_at_least_32_bytes_long!!", 24);
        let other = AuthManager::new(b"another_secret_also_32_bytes_long!!!", 24);
        let token = manager.generate_token(&test_user(UserRole::Coach)).unwrap();

        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_missing_bearer_prefix_rejected() {
        let manager = AuthManager::new(b"test_secret_at_least_32_bytes_long!!", 24);
        let token = manager.generate_token(&test_user(UserRole::Coach)).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("authorization", token.parse().unwrap());

        let err = manager.authenticate_request(&headers).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::AuthInvalid);
    }
}
