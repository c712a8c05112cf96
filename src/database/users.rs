// ABOUTME: Database operations for registered accounts
// ABOUTME: Handles account creation and credential lookup for authentication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};

/// Account database operations manager
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a new users manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new account
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the email or username is already in use, or a
    /// database error otherwise.
    pub async fn create(&self, user: &User) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, user).await
    }

    /// Insert an account row on an existing connection or transaction
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the email or username is already in use, or a
    /// database error otherwise.
    pub async fn insert(conn: &mut SqliteConnection, user: &User) -> AppResult<()> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, username, email, password_hash, name, role,
                               date_of_birth, club_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.date_of_birth.map(|d| d.to_string()))
        .bind(&user.club_name)
        .bind(user.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::conflict(
                "Email or username already in use",
            )),
            Err(e) => Err(AppError::database(format!("Failed to create user: {e}"))),
        }
    }

    /// Get an account by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Look up an account by username or email for login
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_by_username_or_email(&self, needle: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1 OR email = $1")
            .bind(needle)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    let date_of_birth: Option<String> = row.try_get("date_of_birth")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid user id in row: {e}")))?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        role: role.parse::<UserRole>()?,
        date_of_birth: date_of_birth
            .map(|d| {
                d.parse::<NaiveDate>()
                    .map_err(|e| AppError::database(format!("Invalid date of birth in row: {e}")))
            })
            .transpose()?,
        club_name: row.try_get("club_name")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::database(format!("Invalid created_at in row: {e}")))?
            .with_timezone(&Utc),
    })
}
