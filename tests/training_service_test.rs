// ABOUTME: Integration tests for the training lifecycle service
// ABOUTME: Creation seeding, exercise tri-state, status transitions, and access gating
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use salto_server::database::relationships::RelationshipLedger;
use salto_server::database::trainings::{ExerciseStatusUpdate, TrainingFieldsUpdate, TrainingsManager};
use salto_server::database::Database;
use salto_server::database::gymnasts::GymnastsManager;
use salto_server::errors::ErrorCode;
use salto_server::models::{Caller, Location, TrainingStatus};
use salto_server::permissions::AccessPolicy;
use salto_server::services::trainings::{CreateTrainingRequest, TrainingService};

fn service(database: &Database) -> TrainingService {
    let ledger = RelationshipLedger::new(database.pool().clone());
    TrainingService::new(
        TrainingsManager::new(database.pool().clone()),
        GymnastsManager::new(database.pool().clone()),
        ledger.clone(),
        AccessPolicy::new(ledger),
    )
}

fn gym_location() -> Location {
    Location {
        latitude: 52.37,
        longitude: 4.89,
        address: Some("Main gym".to_owned()),
    }
}

fn plan(gymnast_id: Uuid, coach_id: Option<Uuid>, exercises: &[&str]) -> CreateTrainingRequest {
    CreateTrainingRequest {
        gymnast_id,
        coach_id,
        date: Utc::now() + Duration::days(1),
        location: gym_location(),
        exercises: exercises.iter().map(|&s| s.to_owned()).collect(),
    }
}

#[tokio::test]
async fn test_create_seeds_scheduled_with_planned_exercises() {
    let database = common::test_database().await;
    let ledger = RelationshipLedger::new(database.pool().clone());
    let coach = common::seed_coach(&database, "coach_vera").await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    ledger.link(coach.id, gymnast.user_id).await.unwrap();

    let service = service(&database);
    let caller = Caller::coach(coach.id);
    let training = service
        .create(&caller, plan(gymnast.user_id, Some(coach.id), &["pushups", "pullups"]))
        .await
        .unwrap();

    assert_eq!(training.status, TrainingStatus::Scheduled);
    assert_eq!(training.exercises.len(), 2);
    // Planned exercises start as attempted-and-pending, not unknown
    assert!(training.exercises.iter().all(|e| e.completed == Some(false)));
}

#[tokio::test]
async fn test_create_for_missing_gymnast_is_not_found() {
    let database = common::test_database().await;
    let coach = common::seed_coach(&database, "coach_vera").await;
    let service = service(&database);

    let err = service
        .create(
            &Caller::coach(coach.id),
            plan(Uuid::new_v4(), Some(coach.id), &["pushups"]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_create_rejects_duplicate_plan_entries() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);

    let err = service
        .create(
            &Caller::gymnast(gymnast.user_id),
            plan(gymnast.user_id, None, &["pushups", "pushups"]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn test_exercise_status_update_targets_named_exercise_only() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    let training = service
        .create(&caller, plan(gymnast.user_id, None, &["pushups", "pullups"]))
        .await
        .unwrap();

    let updated = service
        .update_exercise_status(
            &caller,
            training.id,
            &[ExerciseStatusUpdate {
                name: "pushups".to_owned(),
                completed: true,
            }],
        )
        .await
        .unwrap();

    let pushups = updated.exercises.iter().find(|e| e.name == "pushups").unwrap();
    let pullups = updated.exercises.iter().find(|e| e.name == "pullups").unwrap();
    assert_eq!(pushups.completed, Some(true));
    assert_eq!(pullups.completed, Some(false));
}

#[tokio::test]
async fn test_exercise_status_update_skips_unknown_names() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    let training = service
        .create(&caller, plan(gymnast.user_id, None, &["pushups"]))
        .await
        .unwrap();

    // An update naming a missing exercise is not an error
    let updated = service
        .update_exercise_status(
            &caller,
            training.id,
            &[
                ExerciseStatusUpdate {
                    name: "handstand".to_owned(),
                    completed: true,
                },
                ExerciseStatusUpdate {
                    name: "pushups".to_owned(),
                    completed: true,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(updated.exercises.len(), 1);
    assert_eq!(updated.exercises[0].completed, Some(true));
}

#[tokio::test]
async fn test_exercise_status_update_applies_the_same_twice() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    let training = service
        .create(&caller, plan(gymnast.user_id, None, &["pushups", "pullups"]))
        .await
        .unwrap();

    let updates = [ExerciseStatusUpdate {
        name: "pushups".to_owned(),
        completed: true,
    }];
    let first = service
        .update_exercise_status(&caller, training.id, &updates)
        .await
        .unwrap();
    // A client retry of the exact same update lands in the same state
    let second = service
        .update_exercise_status(&caller, training.id, &updates)
        .await
        .unwrap();

    assert_eq!(first.exercises, second.exercises);
    let pushups = second.exercises.iter().find(|e| e.name == "pushups").unwrap();
    let pullups = second.exercises.iter().find(|e| e.name == "pullups").unwrap();
    assert_eq!(pushups.completed, Some(true));
    assert_eq!(pullups.completed, Some(false));
}

#[tokio::test]
async fn test_added_exercises_are_distinguishable_from_planned() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    let training = service
        .create(&caller, plan(gymnast.user_id, None, &["pushups"]))
        .await
        .unwrap();

    let updated = service
        .add_exercises(&caller, training.id, &["handstand".to_owned()])
        .await
        .unwrap();

    let planned = updated.exercises.iter().find(|e| e.name == "pushups").unwrap();
    let added = updated.exercises.iter().find(|e| e.name == "handstand").unwrap();
    assert_eq!(planned.completed, Some(false));
    assert_eq!(added.completed, None);
}

#[tokio::test]
async fn test_add_exercises_rejects_duplicates() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    let training = service
        .create(&caller, plan(gymnast.user_id, None, &["pushups"]))
        .await
        .unwrap();

    let err = service
        .add_exercises(&caller, training.id, &["pushups".to_owned()])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    // The training is unchanged after the rejected append
    let unchanged = service.read(&caller, training.id).await.unwrap();
    assert_eq!(unchanged.exercises.len(), 1);
}

#[tokio::test]
async fn test_status_transitions_are_explicit() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    // A session dated in the past still reads back as scheduled
    let mut request = plan(gymnast.user_id, None, &[]);
    request.date = Utc::now() - Duration::days(3);
    let training = service.create(&caller, request).await.unwrap();
    let read_back = service.read(&caller, training.id).await.unwrap();
    assert_eq!(read_back.status, TrainingStatus::Scheduled);

    let updated = service
        .update_status(&caller, training.id, TrainingStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.status, TrainingStatus::Completed);
}

#[tokio::test]
async fn test_status_cannot_enter_the_default() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    let training = service
        .create(&caller, plan(gymnast.user_id, None, &[]))
        .await
        .unwrap();

    let err = service
        .update_status(&caller, training.id, TrainingStatus::Default)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
}

#[tokio::test]
async fn test_unlinked_coach_is_denied_everywhere() {
    let database = common::test_database().await;
    let ledger = RelationshipLedger::new(database.pool().clone());
    let coach = common::seed_coach(&database, "coach_vera").await;
    let stranger = common::seed_coach(&database, "coach_rival").await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    ledger.link(coach.id, gymnast.user_id).await.unwrap();

    let service = service(&database);
    let training = service
        .create(&Caller::coach(coach.id), plan(gymnast.user_id, Some(coach.id), &["pushups"]))
        .await
        .unwrap();

    let intruder = Caller::coach(stranger.id);
    assert_eq!(
        service.read(&intruder, training.id).await.unwrap_err().code,
        ErrorCode::Forbidden
    );
    assert_eq!(
        service
            .update_status(&intruder, training.id, TrainingStatus::Missed)
            .await
            .unwrap_err()
            .code,
        ErrorCode::Forbidden
    );
    assert_eq!(
        service
            .add_exercises(&intruder, training.id, &["vault".to_owned()])
            .await
            .unwrap_err()
            .code,
        ErrorCode::Forbidden
    );
    assert_eq!(
        service
            .list_for_owner(&intruder, gymnast.user_id)
            .await
            .unwrap_err()
            .code,
        ErrorCode::Forbidden
    );
}

#[tokio::test]
async fn test_field_update_never_moves_ownership() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    let training = service
        .create(&caller, plan(gymnast.user_id, None, &[]))
        .await
        .unwrap();

    let new_date = Utc::now() + Duration::days(7);
    let updated = service
        .update_fields(
            &caller,
            training.id,
            TrainingFieldsUpdate {
                date: Some(new_date),
                location: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.gymnast_id, gymnast.user_id);
    assert_eq!(updated.date.timestamp(), new_date.timestamp());
    // Untouched fields survive the partial update
    assert_eq!(updated.location.address.as_deref(), Some("Main gym"));
}

#[tokio::test]
async fn test_owner_listing_is_newest_first() {
    let database = common::test_database().await;
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    for days in [3, 1, 2] {
        let mut request = plan(gymnast.user_id, None, &[]);
        request.date = Utc::now() + Duration::days(days);
        service.create(&caller, request).await.unwrap();
    }

    let listed = service.list_for_owner(&caller, gymnast.user_id).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.windows(2).all(|w| w[0].date >= w[1].date));
}

#[tokio::test]
async fn test_roster_feed_annotates_gymnast_usernames() {
    let database = common::test_database().await;
    let ledger = RelationshipLedger::new(database.pool().clone());
    let coach = common::seed_coach(&database, "coach_vera").await;
    let simone = common::seed_gymnast(&database, "simone").await;
    let rebeca = common::seed_gymnast(&database, "rebeca").await;
    ledger.link(coach.id, simone.user_id).await.unwrap();
    ledger.link(coach.id, rebeca.user_id).await.unwrap();

    let service = service(&database);
    let caller = Caller::coach(coach.id);
    service
        .create(&caller, plan(simone.user_id, Some(coach.id), &[]))
        .await
        .unwrap();
    service
        .create(&caller, plan(rebeca.user_id, Some(coach.id), &[]))
        .await
        .unwrap();

    let feed = service.list_for_coach_roster(coach.id).await.unwrap();
    assert_eq!(feed.len(), 2);

    let mut usernames: Vec<&str> = feed.iter().map(|t| t.gymnast_username.as_str()).collect();
    usernames.sort_unstable();
    assert_eq!(usernames, vec!["rebeca", "simone"]);
}

#[tokio::test]
async fn test_roster_feed_is_empty_for_empty_roster() {
    let database = common::test_database().await;
    let coach = common::seed_coach(&database, "coach_vera").await;

    let feed = service(&database)
        .list_for_coach_roster(coach.id)
        .await
        .unwrap();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_concurrent_exercise_mutations_both_land() {
    // File-backed database so both pool connections share one store
    let path = std::env::temp_dir().join(format!("salto-test-{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}", path.display());
    let database = Database::new(&url).await.unwrap();
    let gymnast = common::seed_gymnast(&database, "simone").await;
    let service = service(&database);
    let caller = Caller::gymnast(gymnast.user_id);

    let training = service
        .create(&caller, plan(gymnast.user_id, None, &["pushups"]))
        .await
        .unwrap();

    // Two writers on the same training queue instead of erroring out, and
    // neither update is lost
    let flip_updates = [ExerciseStatusUpdate {
        name: "pushups".to_owned(),
        completed: true,
    }];
    let flip = service.update_exercise_status(&caller, training.id, &flip_updates);
    let append_names = ["vault".to_owned()];
    let append = service.add_exercises(&caller, training.id, &append_names);
    let (flip, append) = tokio::join!(flip, append);
    flip.unwrap();
    append.unwrap();

    let settled = service.read(&caller, training.id).await.unwrap();
    assert_eq!(settled.exercises.len(), 2);
    let pushups = settled.exercises.iter().find(|e| e.name == "pushups").unwrap();
    let vault = settled.exercises.iter().find(|e| e.name == "vault").unwrap();
    assert_eq!(pushups.completed, Some(true));
    assert_eq!(vault.completed, None);

    drop(service);
    drop(database);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
