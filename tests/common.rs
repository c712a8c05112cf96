// ABOUTME: Shared helpers for integration tests
// ABOUTME: In-memory database construction and coach/gymnast seeding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

#![allow(dead_code, missing_docs, clippy::unwrap_used)]

use chrono::Utc;
use uuid::Uuid;

use salto_server::database::coaches::CoachesManager;
use salto_server::database::gymnasts::GymnastsManager;
use salto_server::database::users::UsersManager;
use salto_server::database::Database;
use salto_server::models::{Coach, Gymnast, User, UserRole};

/// Fresh in-memory database with the full schema applied
pub async fn test_database() -> Database {
    Database::new("sqlite::memory:").await.unwrap()
}

/// Create an account row with the given role
pub async fn seed_user(database: &Database, username: &str, role: UserRole) -> User {
    let user = User {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        password_hash: "hash".to_owned(),
        name: username.to_owned(),
        role,
        date_of_birth: None,
        club_name: None,
        created_at: Utc::now(),
    };
    UsersManager::new(database.pool().clone())
        .create(&user)
        .await
        .unwrap();
    user
}

/// Create an account plus its coach record
pub async fn seed_coach(database: &Database, username: &str) -> Coach {
    let user = seed_user(database, username, UserRole::Coach).await;
    CoachesManager::new(database.pool().clone())
        .create(user.id, &user.name)
        .await
        .unwrap()
}

/// Create an account plus its gymnast record
pub async fn seed_gymnast(database: &Database, username: &str) -> Gymnast {
    let user = seed_user(database, username, UserRole::Gymnast).await;
    GymnastsManager::new(database.pool().clone())
        .create(user.id, &user.username)
        .await
        .unwrap()
}
