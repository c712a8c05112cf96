// ABOUTME: Main server binary wiring configuration, database, and the REST API
// ABOUTME: Loads environment config, runs migrations, and serves the axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salto

//! # Salto Server Binary
//!
//! Starts the coaching platform REST API with JWT authentication and
//! `SQLite` storage.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use salto_server::config::ServerConfig;
use salto_server::context::ServerResources;
use salto_server::database::Database;
use salto_server::{logging, routes};

#[derive(Parser)]
#[command(name = "salto-server")]
#[command(about = "Salto - coaching platform for gymnastics clubs")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Salto server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    info!("Database initialized: {}", config.database_url);

    let http_port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, config));
    let router = routes::router(resources);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, router).await?;
    Ok(())
}
