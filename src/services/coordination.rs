// ABOUTME: Coordination façade tying the relationship ledger, policy, and season goals together
// ABOUTME: Link management, roster/coach listings, and the asymmetric season-goal surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! # Coordination Service
//!
//! Single entry point for operations that span the relationship ledger and
//! the entity stores: linking and unlinking pairs, resolving a coach's
//! roster or a gymnast's coaches as full records, and the season-goal
//! surface with its asymmetric policy (a linked coach writes, the gymnast
//! reads their own).

use uuid::Uuid;

use crate::database::coaches::CoachesManager;
use crate::database::gymnasts::GymnastsManager;
use crate::database::relationships::RelationshipLedger;
use crate::errors::{AppError, AppResult};
use crate::models::{Caller, Coach, Gymnast};
use crate::permissions::AccessPolicy;

/// Façade over relationship and season-goal coordination
pub struct CoordinationService {
    ledger: RelationshipLedger,
    coaches: CoachesManager,
    gymnasts: GymnastsManager,
    policy: AccessPolicy,
}

impl CoordinationService {
    /// Create a coordination service over the shared managers
    #[must_use]
    pub const fn new(
        ledger: RelationshipLedger,
        coaches: CoachesManager,
        gymnasts: GymnastsManager,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            ledger,
            coaches,
            gymnasts,
            policy,
        }
    }

    /// Link a coach to a gymnast
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either entity is missing and `Conflict` if the
    /// pair is already linked.
    pub async fn link(&self, coach_id: Uuid, gymnast_id: Uuid) -> AppResult<()> {
        self.ledger.link(coach_id, gymnast_id).await
    }

    /// Unlink a coach from a gymnast
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the pair is not currently linked.
    pub async fn unlink(&self, coach_id: Uuid, gymnast_id: Uuid) -> AppResult<()> {
        self.ledger.unlink(coach_id, gymnast_id).await
    }

    /// A coach's roster resolved to full gymnast records, in link order
    ///
    /// A roster entry whose gymnast record has since been removed is
    /// silently dropped rather than failing the whole listing.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the coach does not exist.
    pub async fn roster(&self, coach_id: Uuid) -> AppResult<Vec<Gymnast>> {
        if self.coaches.get(coach_id).await?.is_none() {
            return Err(AppError::not_found(format!("Coach {coach_id}")));
        }

        let ids = self.ledger.gymnasts_of(coach_id).await?;
        let mut roster = Vec::with_capacity(ids.len());
        for gymnast_id in ids {
            if let Some(gymnast) = self.gymnasts.get(gymnast_id).await? {
                roster.push(gymnast);
            }
        }
        Ok(roster)
    }

    /// All coaches linked to a gymnast, resolved to full records
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the gymnast does not exist.
    pub async fn coaches_of(&self, gymnast_id: Uuid) -> AppResult<Vec<Coach>> {
        if self.gymnasts.get(gymnast_id).await?.is_none() {
            return Err(AppError::not_found(format!("Gymnast {gymnast_id}")));
        }

        let ids = self.ledger.coaches_of(gymnast_id).await?;
        let mut coaches = Vec::with_capacity(ids.len());
        for coach_id in ids {
            if let Some(coach) = self.coaches.get(coach_id).await? {
                coaches.push(coach);
            }
        }
        Ok(coaches)
    }

    /// Set a gymnast's season goals (coaching action)
    ///
    /// Returns the updated gymnast record.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller is a coach linked to the
    /// gymnast, and `NotFound` if the gymnast does not exist.
    pub async fn write_season_goal(
        &self,
        caller: &Caller,
        gymnast_id: Uuid,
        goals: &str,
    ) -> AppResult<Gymnast> {
        self.policy.authorize_goal_write(caller, gymnast_id).await?;
        self.gymnasts.update_season_goals(gymnast_id, goals).await?;

        tracing::info!(coach_id = %caller.id, %gymnast_id, "season goals updated");

        self.gymnasts
            .get(gymnast_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Gymnast {gymnast_id}")))
    }

    /// Read a gymnast's own season goals (self-service action)
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller is the gymnast themselves, and
    /// `NotFound` if the record does not exist.
    pub async fn read_season_goal(
        &self,
        caller: &Caller,
        gymnast_id: Uuid,
    ) -> AppResult<Option<String>> {
        self.policy.authorize_goal_read(caller, gymnast_id)?;

        let gymnast = self
            .gymnasts
            .get(gymnast_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Gymnast {gymnast_id}")))?;
        Ok(gymnast.season_goals)
    }
}
