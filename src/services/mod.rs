// ABOUTME: Service layer modules sitting between HTTP routes and storage
// ABOUTME: Training lifecycle and relationship/season-goal coordination
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! Business-logic services. Routes translate HTTP into calls here; the
//! services enforce authorization and invariants before touching storage.

pub mod coordination;
pub mod trainings;
