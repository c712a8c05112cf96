// ABOUTME: Main library entry point for the Salto coaching platform
// ABOUTME: Coach-gymnast relationship management, training lifecycle, and season goals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

#![deny(unsafe_code)]

//! # Salto Server
//!
//! A coaching platform for gymnastics clubs. Coaches and gymnasts register
//! accounts, coaches link gymnasts into their roster, and training sessions
//! are planned, tracked, and reviewed per gymnast.
//!
//! ## Architecture
//!
//! - **Models**: Accounts, coaches, gymnasts, trainings, and exercises
//! - **Database**: `SQLite`-backed managers, one per resource
//! - **Relationship Ledger**: the normalized coach↔gymnast linkage
//! - **Permissions**: role-aware access rules over the ledger
//! - **Services**: training lifecycle and relationship coordination
//! - **Routes**: axum REST surface with JWT authentication

pub mod auth;
pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod logging;
pub mod models;
pub mod permissions;
pub mod routes;
pub mod services;
