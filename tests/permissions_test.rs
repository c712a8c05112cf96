// ABOUTME: Integration tests for the access policy against a live relationship ledger
// ABOUTME: Verifies link-state freshness and the asymmetric season-goal rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use salto_server::database::relationships::RelationshipLedger;
use salto_server::errors::ErrorCode;
use salto_server::models::Caller;
use salto_server::permissions::AccessPolicy;
use uuid::Uuid;

#[tokio::test]
async fn test_linked_coach_gains_access() {
    let database = common::test_database().await;
    let ledger = RelationshipLedger::new(database.pool().clone());
    let policy = AccessPolicy::new(ledger.clone());
    let coach = common::seed_coach(&database, "coach_vera").await;
    let gymnast = common::seed_gymnast(&database, "simone").await;

    let caller = Caller::coach(coach.id);
    let err = policy
        .authorize_gymnast_data(&caller, gymnast.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    ledger.link(coach.id, gymnast.user_id).await.unwrap();
    policy
        .authorize_gymnast_data(&caller, gymnast.user_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unlink_revokes_access_immediately() {
    let database = common::test_database().await;
    let ledger = RelationshipLedger::new(database.pool().clone());
    let policy = AccessPolicy::new(ledger.clone());
    let coach = common::seed_coach(&database, "coach_vera").await;
    let gymnast = common::seed_gymnast(&database, "simone").await;

    ledger.link(coach.id, gymnast.user_id).await.unwrap();
    let caller = Caller::coach(coach.id);
    policy
        .authorize_gymnast_data(&caller, gymnast.user_id)
        .await
        .unwrap();

    ledger.unlink(coach.id, gymnast.user_id).await.unwrap();
    let err = policy
        .authorize_gymnast_data(&caller, gymnast.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn test_gymnast_self_access_needs_no_link() {
    let database = common::test_database().await;
    let policy = AccessPolicy::new(RelationshipLedger::new(database.pool().clone()));
    let gymnast = common::seed_gymnast(&database, "simone").await;

    let caller = Caller::gymnast(gymnast.user_id);
    policy
        .authorize_gymnast_data(&caller, gymnast.user_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_gymnast_denied_on_other_gymnasts() {
    let database = common::test_database().await;
    let policy = AccessPolicy::new(RelationshipLedger::new(database.pool().clone()));
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let other = common::seed_gymnast(&database, "rebeca").await;

    let caller = Caller::gymnast(gymnast.user_id);
    let err = policy
        .authorize_gymnast_data(&caller, other.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn test_denial_message_is_uniform() {
    let database = common::test_database().await;
    let policy = AccessPolicy::new(RelationshipLedger::new(database.pool().clone()));
    let gymnast = common::seed_gymnast(&database, "simone").await;

    let unlinked_coach = Caller::coach(Uuid::new_v4());
    let foreign_gymnast = Caller::gymnast(Uuid::new_v4());

    let coach_err = policy
        .authorize_gymnast_data(&unlinked_coach, gymnast.user_id)
        .await
        .unwrap_err();
    let gymnast_err = policy
        .authorize_gymnast_data(&foreign_gymnast, gymnast.user_id)
        .await
        .unwrap_err();

    assert_eq!(coach_err.message, gymnast_err.message);
}

#[tokio::test]
async fn test_goal_write_requires_linked_coach() {
    let database = common::test_database().await;
    let ledger = RelationshipLedger::new(database.pool().clone());
    let policy = AccessPolicy::new(ledger.clone());
    let coach = common::seed_coach(&database, "coach_vera").await;
    let gymnast = common::seed_gymnast(&database, "simone").await;

    let coach_caller = Caller::coach(coach.id);
    assert!(policy
        .authorize_goal_write(&coach_caller, gymnast.user_id)
        .await
        .is_err());

    ledger.link(coach.id, gymnast.user_id).await.unwrap();
    policy
        .authorize_goal_write(&coach_caller, gymnast.user_id)
        .await
        .unwrap();

    // The gymnast never writes their own goals, linked or not
    let self_caller = Caller::gymnast(gymnast.user_id);
    assert!(policy
        .authorize_goal_write(&self_caller, gymnast.user_id)
        .await
        .is_err());
}

#[tokio::test]
async fn test_goal_read_is_self_only() {
    let database = common::test_database().await;
    let ledger = RelationshipLedger::new(database.pool().clone());
    let policy = AccessPolicy::new(ledger.clone());
    let coach = common::seed_coach(&database, "coach_vera").await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    ledger.link(coach.id, gymnast.user_id).await.unwrap();

    let self_caller = Caller::gymnast(gymnast.user_id);
    policy
        .authorize_goal_read(&self_caller, gymnast.user_id)
        .unwrap();

    // Even a linked coach cannot use the self-service read
    let coach_caller = Caller::coach(coach.id);
    assert!(policy
        .authorize_goal_read(&coach_caller, gymnast.user_id)
        .is_err());
}
