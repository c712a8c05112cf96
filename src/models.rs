// ABOUTME: Core data models for the Salto training platform
// ABOUTME: Defines User, Coach, Gymnast, Training, Exercise and the caller identity types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! # Data Models
//!
//! Core data structures shared by the storage, policy, and service layers.
//!
//! ## Design Principles
//!
//! - **Closed role type**: coach/gymnast is a two-variant enum, never a
//!   free-form string checked at runtime.
//! - **Explicit caller identity**: every authorization-gated call receives a
//!   [`Caller`], never an ambient request context.
//! - **Tri-state exercises**: an exercise's completion is `Option<bool>`:
//!   `None` not yet attempted, `Some(false)` attempted and pending,
//!   `Some(true)` done.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Account role, a closed two-variant type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Coaches see data for gymnasts currently linked to them
    Coach,
    /// Gymnasts see only their own data
    Gymnast,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Coach => "coach",
            Self::Gymnast => "gymnast",
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    /// Parse from database or token string representation
    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "coach" => Ok(Self::Coach),
            "gymnast" => Ok(Self::Gymnast),
            other => Err(AppError::invalid_input(format!("Unknown role: {other}"))),
        }
    }
}

/// Resolved caller identity handed to the core by the transport layer
///
/// For gymnast callers `id` is the account id (which is also the gymnast's
/// primary key). For coach callers `id` is the coach record id, resolved
/// from the authenticated account once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Entity identity (coach id or gymnast id)
    pub id: Uuid,
    /// Caller role
    pub role: UserRole,
}

impl Caller {
    /// Caller acting as a coach
    #[must_use]
    pub const fn coach(id: Uuid) -> Self {
        Self {
            id,
            role: UserRole::Coach,
        }
    }

    /// Caller acting as a gymnast
    #[must_use]
    pub const fn gymnast(id: Uuid) -> Self {
        Self {
            id,
            role: UserRole::Gymnast,
        }
    }
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Unique username
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Hashed password for authentication
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub name: String,
    /// Account role
    pub role: UserRole,
    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// Club the user belongs to
    pub club_name: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Coach entity
///
/// The coach record id is distinct from the owning account id; linkage and
/// training annotations are keyed by the coach record id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coach {
    /// Unique coach identifier
    pub id: Uuid,
    /// Owning account
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// When the coach record was created
    pub created_at: DateTime<Utc>,
}

/// Gymnast entity
///
/// The gymnast's primary key IS the owning account id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gymnast {
    /// Owning account id, also the gymnast's identity
    pub user_id: Uuid,
    /// Unique username for display
    pub username: String,
    /// Free-text season goals, written only by an authorized coach
    pub season_goals: Option<String>,
    /// When the gymnast record was created
    pub created_at: DateTime<Utc>,
}

/// A single exercise within a training session
///
/// `completed` is tri-state: `None` means not yet attempted (added after the
/// session was planned), `Some(false)` attempted and pending (part of the
/// original plan), `Some(true)` done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Exercise name, unique within one training
    pub name: String,
    /// Tri-state completion
    pub completed: Option<bool>,
}

/// Geographic location of a training session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Optional street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Training session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    /// Planned and not yet held
    Scheduled,
    /// Held and completed
    Completed,
    /// Planned but not held
    Missed,
    /// Defensive default, never produced by the create path
    #[default]
    Default,
}

impl TrainingStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Missed => "missed",
            Self::Default => "default",
        }
    }

    /// Parse a stored value, falling back to the defensive default
    #[must_use]
    pub fn parse_stored(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for TrainingStatus {
    type Err = AppError;

    /// Parse a status value supplied by a caller
    ///
    /// Returns `InvalidState` for values outside the status vocabulary.
    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "missed" => Ok(Self::Missed),
            "default" => Ok(Self::Default),
            other => Err(AppError::invalid_state(format!(
                "Unknown training status: {other}"
            ))),
        }
    }
}

/// Training session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
    /// Unique training identifier
    pub id: Uuid,
    /// Owning gymnast, set at creation and never changed
    pub gymnast_id: Uuid,
    /// Scheduling coach, if any
    pub coach_id: Option<Uuid>,
    /// When the session takes place
    pub date: DateTime<Utc>,
    /// Where the session takes place
    pub location: Location,
    /// Ordered exercise sequence, names unique within the training
    pub exercises: Vec<Exercise>,
    /// Session status
    pub status: TrainingStatus,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Training annotated with the owning gymnast's username for coach feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingWithGymnast {
    /// The training record
    #[serde(flatten)]
    pub training: Training,
    /// Display name of the owning gymnast
    pub gymnast_username: String,
}
