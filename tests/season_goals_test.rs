// ABOUTME: Integration tests for season-goal coordination
// ABOUTME: Coach-gated writes, self-service reads, and roster resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use salto_server::database::coaches::CoachesManager;
use salto_server::database::gymnasts::GymnastsManager;
use salto_server::database::relationships::RelationshipLedger;
use salto_server::database::Database;
use salto_server::errors::ErrorCode;
use salto_server::models::Caller;
use salto_server::permissions::AccessPolicy;
use salto_server::services::coordination::CoordinationService;
use uuid::Uuid;

fn service(database: &Database) -> CoordinationService {
    let ledger = RelationshipLedger::new(database.pool().clone());
    CoordinationService::new(
        ledger.clone(),
        CoachesManager::new(database.pool().clone()),
        GymnastsManager::new(database.pool().clone()),
        AccessPolicy::new(ledger),
    )
}

#[tokio::test]
async fn test_linked_coach_sets_goals_and_gymnast_reads_them() {
    let database = common::test_database().await;
    let coach = common::seed_coach(&database, "coach_vera").await;
    let gymnast = common::seed_gymnast(&database, "simone").await;

    let service = service(&database);
    service.link(coach.id, gymnast.user_id).await.unwrap();

    let updated = service
        .write_season_goal(
            &Caller::coach(coach.id),
            gymnast.user_id,
            "Land the double layout by May",
        )
        .await
        .unwrap();
    assert_eq!(
        updated.season_goals.as_deref(),
        Some("Land the double layout by May")
    );

    let goals = service
        .read_season_goal(&Caller::gymnast(gymnast.user_id), gymnast.user_id)
        .await
        .unwrap();
    assert_eq!(goals.as_deref(), Some("Land the double layout by May"));
}

#[tokio::test]
async fn test_unlinked_coach_cannot_set_goals() {
    let database = common::test_database().await;
    let coach = common::seed_coach(&database, "coach_vera").await;
    let gymnast = common::seed_gymnast(&database, "simone").await;

    let err = service(&database)
        .write_season_goal(&Caller::coach(coach.id), gymnast.user_id, "Anything")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn test_gymnast_cannot_write_own_goals() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;

    let err = service(&database)
        .write_season_goal(
            &Caller::gymnast(gymnast.user_id),
            gymnast.user_id,
            "My own plan",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn test_unset_goals_read_as_none() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;

    let goals = service(&database)
        .read_season_goal(&Caller::gymnast(gymnast.user_id), gymnast.user_id)
        .await
        .unwrap();
    assert!(goals.is_none());
}

#[tokio::test]
async fn test_roster_resolves_full_records_in_link_order() {
    let database = common::test_database().await;
    let coach = common::seed_coach(&database, "coach_vera").await;
    let simone = common::seed_gymnast(&database, "simone").await;
    let rebeca = common::seed_gymnast(&database, "rebeca").await;

    let service = service(&database);
    service.link(coach.id, simone.user_id).await.unwrap();
    service.link(coach.id, rebeca.user_id).await.unwrap();

    let roster = service.roster(coach.id).await.unwrap();
    let usernames: Vec<&str> = roster.iter().map(|g| g.username.as_str()).collect();
    assert_eq!(usernames, vec!["simone", "rebeca"]);

    let coaches = service.coaches_of(simone.user_id).await.unwrap();
    assert_eq!(coaches.len(), 1);
    assert_eq!(coaches[0].id, coach.id);
}

#[tokio::test]
async fn test_roster_of_missing_coach_is_not_found() {
    let database = common::test_database().await;
    let err = service(&database).roster(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}
