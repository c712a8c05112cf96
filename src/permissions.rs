// ABOUTME: Role-aware authorization policy for gymnast-owned training data
// ABOUTME: Pure rule evaluation plus a ledger-consulting gate used by every service call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! # Authorization Policy
//!
//! Decides whether a caller may touch data owned by a gymnast. The rules are
//! evaluated in order, first match wins:
//!
//! 1. a gymnast always has self-access to their own records
//! 2. a coach has access while the relationship ledger confirms an active
//!    link to the owning gymnast
//! 3. everything else is denied
//!
//! Season goals are the one asymmetric surface: goal-setting is a coaching
//! action (a linked coach writes, the gymnast cannot), goal-viewing is
//! self-service (the gymnast reads, via self-access).
//!
//! The rule itself is a pure function over the caller and the link state,
//! so it unit-tests without storage. [`AccessPolicy`] wraps it with a fresh
//! ledger lookup per call; decisions are never cached, so an unlink takes
//! effect on the very next request. Denials surface as `Forbidden` with a
//! uniform message that never reveals which rule might have matched; the
//! reason tag goes to tracing only.

use uuid::Uuid;

use crate::database::relationships::RelationshipLedger;
use crate::errors::{AppError, AppResult};
use crate::models::{Caller, UserRole};

/// Why a decision came out the way it did, for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    /// Caller is the gymnast who owns the record
    SelfAccess,
    /// Caller is a coach with an active link to the owning gymnast
    LinkedCoach,
    /// Caller has no qualifying relationship to the owning gymnast
    NoRelationship,
    /// Caller's role can never qualify for this operation
    UnknownRole,
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    /// Whether the operation may proceed
    pub allowed: bool,
    /// Matched (or final) rule
    pub reason: AccessReason,
}

impl AccessDecision {
    const fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    const fn deny(reason: AccessReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// Pure data-access rule for gymnast-owned records
///
/// `linked` is the ledger's answer for (caller, owning gymnast) and is only
/// consulted when the caller is a coach.
#[must_use]
pub fn evaluate_data_access(caller: &Caller, gymnast_id: Uuid, linked: bool) -> AccessDecision {
    match caller.role {
        UserRole::Gymnast if caller.id == gymnast_id => {
            AccessDecision::allow(AccessReason::SelfAccess)
        }
        UserRole::Coach if linked => AccessDecision::allow(AccessReason::LinkedCoach),
        UserRole::Coach => AccessDecision::deny(AccessReason::NoRelationship),
        UserRole::Gymnast => AccessDecision::deny(AccessReason::NoRelationship),
    }
}

/// Pure season-goal write rule: only a linked coach may set goals
#[must_use]
pub fn evaluate_goal_write(caller: &Caller, linked: bool) -> AccessDecision {
    match caller.role {
        UserRole::Coach if linked => AccessDecision::allow(AccessReason::LinkedCoach),
        UserRole::Coach => AccessDecision::deny(AccessReason::NoRelationship),
        UserRole::Gymnast => AccessDecision::deny(AccessReason::UnknownRole),
    }
}

/// Pure season-goal read rule: self-access only
#[must_use]
pub fn evaluate_goal_read(caller: &Caller, gymnast_id: Uuid) -> AccessDecision {
    match caller.role {
        UserRole::Gymnast if caller.id == gymnast_id => {
            AccessDecision::allow(AccessReason::SelfAccess)
        }
        UserRole::Gymnast => AccessDecision::deny(AccessReason::NoRelationship),
        UserRole::Coach => AccessDecision::deny(AccessReason::UnknownRole),
    }
}

/// Ledger-consulting authorization gate
#[derive(Clone)]
pub struct AccessPolicy {
    ledger: RelationshipLedger,
}

impl AccessPolicy {
    /// Create a policy over a relationship ledger
    #[must_use]
    pub const fn new(ledger: RelationshipLedger) -> Self {
        Self { ledger }
    }

    /// Gate access to records owned by a gymnast
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when no rule allows the caller, or a database
    /// error from the link lookup.
    pub async fn authorize_gymnast_data(&self, caller: &Caller, gymnast_id: Uuid) -> AppResult<()> {
        let linked = self.link_state(caller, gymnast_id).await?;
        let decision = evaluate_data_access(caller, gymnast_id, linked);
        Self::settle(caller, gymnast_id, "gymnast-data", decision)
    }

    /// Gate a season-goal write
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller is a coach linked to the
    /// gymnast.
    pub async fn authorize_goal_write(&self, caller: &Caller, gymnast_id: Uuid) -> AppResult<()> {
        let linked = self.link_state(caller, gymnast_id).await?;
        let decision = evaluate_goal_write(caller, linked);
        Self::settle(caller, gymnast_id, "season-goal-write", decision)
    }

    /// Gate a season-goal read
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller is the gymnast themselves.
    pub fn authorize_goal_read(&self, caller: &Caller, gymnast_id: Uuid) -> AppResult<()> {
        let decision = evaluate_goal_read(caller, gymnast_id);
        Self::settle(caller, gymnast_id, "season-goal-read", decision)
    }

    /// Fresh per-call link lookup; only coaches need one
    async fn link_state(&self, caller: &Caller, gymnast_id: Uuid) -> AppResult<bool> {
        match caller.role {
            UserRole::Coach => self.ledger.is_linked(caller.id, gymnast_id).await,
            UserRole::Gymnast => Ok(false),
        }
    }

    fn settle(
        caller: &Caller,
        gymnast_id: Uuid,
        operation: &str,
        decision: AccessDecision,
    ) -> AppResult<()> {
        if decision.allowed {
            tracing::debug!(
                caller = %caller.id,
                role = caller.role.as_str(),
                %gymnast_id,
                operation,
                reason = ?decision.reason,
                "access granted"
            );
            Ok(())
        } else {
            tracing::info!(
                caller = %caller.id,
                role = caller.role.as_str(),
                %gymnast_id,
                operation,
                reason = ?decision.reason,
                "access denied"
            );
            // Uniform message: must not disclose what would have granted access
            Err(AppError::forbidden(
                "You do not have permission to access this gymnast's data",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gymnast_id() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()
    }

    #[test]
    fn test_self_access_ignores_link_state() {
        let caller = Caller::gymnast(gymnast_id());
        let decision = evaluate_data_access(&caller, gymnast_id(), false);
        assert!(decision.allowed);
        assert_eq!(decision.reason, AccessReason::SelfAccess);
    }

    #[test]
    fn test_gymnast_denied_on_foreign_records() {
        let caller = Caller::gymnast(Uuid::new_v4());
        let decision = evaluate_data_access(&caller, gymnast_id(), false);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, AccessReason::NoRelationship);
    }

    #[test]
    fn test_linked_coach_allowed() {
        let caller = Caller::coach(Uuid::new_v4());
        let decision = evaluate_data_access(&caller, gymnast_id(), true);
        assert!(decision.allowed);
        assert_eq!(decision.reason, AccessReason::LinkedCoach);
    }

    #[test]
    fn test_unlinked_coach_denied() {
        let caller = Caller::coach(Uuid::new_v4());
        let decision = evaluate_data_access(&caller, gymnast_id(), false);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, AccessReason::NoRelationship);
    }

    #[test]
    fn test_gymnast_cannot_write_own_goals() {
        let caller = Caller::gymnast(gymnast_id());
        let decision = evaluate_goal_write(&caller, false);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, AccessReason::UnknownRole);
    }

    #[test]
    fn test_linked_coach_writes_goals() {
        let caller = Caller::coach(Uuid::new_v4());
        assert!(evaluate_goal_write(&caller, true).allowed);
        assert!(!evaluate_goal_write(&caller, false).allowed);
    }

    #[test]
    fn test_goal_read_is_self_service_only() {
        let owner = Caller::gymnast(gymnast_id());
        assert!(evaluate_goal_read(&owner, gymnast_id()).allowed);

        let coach = Caller::coach(Uuid::new_v4());
        let decision = evaluate_goal_read(&coach, gymnast_id());
        assert!(!decision.allowed);
        assert_eq!(decision.reason, AccessReason::UnknownRole);
    }
}
