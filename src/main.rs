// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat Mentor service
//!
//! Serves the conversation and session state to the chat-mentor UI and
//! talks to Firebase and the completion API on its behalf.

use chat_mentor::{
    config::Config,
    db::FirestoreDb,
    services::{FirebaseAuthClient, OpenAiClient},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Chat Mentor");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    let identity = FirebaseAuthClient::new(
        config.identity_base_url.clone(),
        config.firebase_api_key.clone(),
    );
    let completion = OpenAiClient::from_config(&config);
    tracing::info!(model = %config.openai_model, "Completion client initialized");

    // Build shared state and reload the on-device snapshots
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(identity),
        Arc::new(db),
        Arc::new(completion),
    ));
    state.restore().await;
    tracing::info!(data_dir = %config.data_dir.display(), "State restored");

    // Build router
    let app = chat_mentor::routes::create_router(state);

    // Start server
    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_mentor=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
