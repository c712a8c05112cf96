// ABOUTME: Database management for the Salto server backed by SQLite via sqlx
// ABOUTME: Owns the connection pool and runs table migrations at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! # Database Management
//!
//! Connection pool ownership and schema migration. Collection-level
//! operations live in per-domain manager modules:
//!
//! - [`users::UsersManager`]: account storage
//! - [`coaches::CoachesManager`]: coach records
//! - [`gymnasts::GymnastsManager`]: gymnast records and season goals
//! - [`relationships::RelationshipLedger`]: coach-gymnast linkage
//! - [`trainings::TrainingsManager`]: training records
//!
//! The coach↔gymnast relationship is stored as a single normalized join
//! table queried from both directions, so relationship symmetry holds by
//! construction and duplicate links are rejected by a unique constraint.

pub mod coaches;
pub mod gymnasts;
pub mod relationships;
pub mod trainings;
pub mod users;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::errors::{AppError, AppResult};

/// Database manager owning the SQLite pool
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// The database file is created if it does not exist. Foreign keys are
    /// enforced so deleting a coach cascades into the join table instead of
    /// orphaning gymnast back-references.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or a migration fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for manager construction
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a table or index cannot be created.
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_coaches().await?;
        self.migrate_gymnasts().await?;
        self.migrate_relationships().await?;
        self.migrate_trainings().await?;
        Ok(())
    }

    async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                date_of_birth TEXT,
                club_name TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_coaches(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS coaches (
                id TEXT PRIMARY KEY,
                user_id TEXT UNIQUE NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_gymnasts(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS gymnasts (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                username TEXT UNIQUE NOT NULL,
                season_goals TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_relationships(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS coach_gymnasts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                coach_id TEXT NOT NULL REFERENCES coaches(id) ON DELETE CASCADE,
                gymnast_id TEXT NOT NULL REFERENCES gymnasts(user_id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE(coach_id, gymnast_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_coach_gymnasts_coach ON coach_gymnasts(coach_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_coach_gymnasts_gymnast ON coach_gymnasts(gymnast_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_trainings(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainings (
                id TEXT PRIMARY KEY,
                gymnast_id TEXT NOT NULL REFERENCES gymnasts(user_id) ON DELETE CASCADE,
                coach_id TEXT REFERENCES coaches(id) ON DELETE SET NULL,
                date TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                address TEXT,
                exercises TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'default',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_trainings_gymnast_date ON trainings(gymnast_id, date DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
