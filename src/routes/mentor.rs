// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Conversation routes.
//!
//! Every handler answers with the full conversation state. Operation
//! failures show up in its `error` field rather than as an error status.

use crate::error::Result;
use crate::store::MentorState;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/mentor", get(get_state))
        .route("/api/mentor/sync", post(fetch_conversations))
        .route("/api/mentor/messages", post(send_message))
        .route("/api/mentor/error", delete(clear_error))
        .route("/api/conversations", post(create_conversation))
        .route("/api/conversations/{id}/select", post(select_conversation))
        .route("/api/conversations/{id}", delete(delete_conversation))
}

#[derive(Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    content: String,
}

async fn get_state(State(state): State<Arc<AppState>>) -> Json<MentorState> {
    Json(state.mentor.snapshot().await)
}

async fn fetch_conversations(State(state): State<Arc<AppState>>) -> Json<MentorState> {
    state.mentor.fetch_conversations().await;
    Json(state.mentor.snapshot().await)
}

/// A malformed body is a request error; everything after that is reported in state.
async fn send_message(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<MentorState>> {
    let Json(body) = body?;
    state.mentor.send_message(&body.content).await;
    Ok(Json(state.mentor.snapshot().await))
}

async fn clear_error(State(state): State<Arc<AppState>>) -> Json<MentorState> {
    state.mentor.clear_error().await;
    Json(state.mentor.snapshot().await)
}

/// Body is optional; without one the default title is used.
async fn create_conversation(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateConversationRequest>>,
) -> Json<MentorState> {
    let title = body.and_then(|Json(body)| body.title);
    state.mentor.create_conversation(title.as_deref()).await;
    Json(state.mentor.snapshot().await)
}

async fn select_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<MentorState> {
    state.mentor.select_conversation(&id).await;
    Json(state.mentor.snapshot().await)
}

async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<MentorState> {
    state.mentor.delete_conversation(&id).await;
    Json(state.mentor.snapshot().await)
}
