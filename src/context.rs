// ABOUTME: Shared server resources handed to every route via axum state
// ABOUTME: Database handle, auth manager, and server configuration in one Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! Shared server state. Constructed once at startup and cloned into each
//! route tree behind an `Arc`.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::coaches::CoachesManager;
use crate::database::gymnasts::GymnastsManager;
use crate::database::relationships::RelationshipLedger;
use crate::database::trainings::TrainingsManager;
use crate::database::users::UsersManager;
use crate::database::Database;
use crate::permissions::AccessPolicy;
use crate::services::coordination::CoordinationService;
use crate::services::trainings::TrainingService;

/// Everything the route handlers need, wired once at startup
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// JWT manager
    pub auth_manager: AuthManager,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Wire up shared resources from a connected database and configuration
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let auth_manager =
            AuthManager::new(config.jwt_secret.as_bytes(), config.jwt_expiry_hours);
        Self {
            database,
            auth_manager,
            config,
        }
    }

    /// Users manager over the shared pool
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.database.pool().clone())
    }

    /// Coaches manager over the shared pool
    #[must_use]
    pub fn coaches(&self) -> CoachesManager {
        CoachesManager::new(self.database.pool().clone())
    }

    /// Gymnasts manager over the shared pool
    #[must_use]
    pub fn gymnasts(&self) -> GymnastsManager {
        GymnastsManager::new(self.database.pool().clone())
    }

    /// Relationship ledger over the shared pool
    #[must_use]
    pub fn ledger(&self) -> RelationshipLedger {
        RelationshipLedger::new(self.database.pool().clone())
    }

    /// Authorization policy over the relationship ledger
    #[must_use]
    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.ledger())
    }

    /// Training lifecycle service
    #[must_use]
    pub fn training_service(&self) -> TrainingService {
        TrainingService::new(
            TrainingsManager::new(self.database.pool().clone()),
            self.gymnasts(),
            self.ledger(),
            self.policy(),
        )
    }

    /// Relationship and season-goal coordination service
    #[must_use]
    pub fn coordination_service(&self) -> CoordinationService {
        CoordinationService::new(self.ledger(), self.coaches(), self.gymnasts(), self.policy())
    }
}
