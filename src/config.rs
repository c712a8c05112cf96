// ABOUTME: Environment-based server configuration loading and validation
// ABOUTME: Reads HTTP port, database URL, and JWT settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! Environment-only server configuration
//!
//! All configuration is read from environment variables at startup; there is
//! no configuration file layer.

use std::env;

use crate::errors::{AppError, AppResult};

/// Default HTTP port when `HTTP_PORT` is unset
const DEFAULT_HTTP_PORT: u16 = 8081;
/// Default database URL when `DATABASE_URL` is unset
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/salto.db";
/// Default JWT expiry when `JWT_EXPIRY_HOURS` is unset
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// SQLite database URL
    pub database_url: String,
    /// Secret used to sign and verify JWTs
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `JWT_SECRET` is missing or a numeric
    /// variable fails to parse.
    pub fn from_env() -> AppResult<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::config(format!("Invalid HTTP_PORT '{raw}': {e}")))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::config("JWT_SECRET must be set"))?;
        if jwt_secret.len() < 32 {
            return Err(AppError::config("JWT_SECRET must be at least 32 bytes"));
        }

        let jwt_expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|e| AppError::config(format!("Invalid JWT_EXPIRY_HOURS '{raw}': {e}")))?,
            Err(_) => DEFAULT_JWT_EXPIRY_HOURS,
        };
        if jwt_expiry_hours <= 0 {
            return Err(AppError::config("JWT_EXPIRY_HOURS must be positive"));
        }

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            jwt_expiry_hours,
        })
    }

    /// Human-readable configuration summary for startup logging
    ///
    /// Never includes the JWT secret.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Salto Server Configuration:\n\
             - HTTP Port: {}\n\
             - Database: {}\n\
             - JWT Expiry: {}h",
            self.http_port, self.database_url, self.jwt_expiry_hours
        )
    }
}
