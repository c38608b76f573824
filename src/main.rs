// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Polls web server
//!
//! Serves the public poll pages and the admin console from one process
//! backed by a SQLite database.

use polls::{config::Config, db::Db, templates::Templates, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        admin_enabled = config.admin.is_some(),
        "Starting polls server"
    );

    // Open the database and apply migrations
    let db = Db::connect(&config.database_url).await?;

    let templates = Templates::new()?;
    tracing::info!("Templates loaded");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        templates,
    });

    // Build router
    let app = polls::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("polls=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
