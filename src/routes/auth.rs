// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up, sign-in and session routes.
//!
//! Failures are returned as error responses; the same message is also kept
//! on the auth state for the next `/auth/session` read.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::store::AuthSnapshot;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signout", post(sign_out))
        .route("/auth/session", get(session))
        .route("/auth/error", delete(clear_error))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    email: String,
    password: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    email: String,
    password: String,
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<Json<AuthSnapshot>> {
    let Json(body) = body?;
    state
        .auth
        .sign_up(&body.email, &body.password, body.display_name.as_deref())
        .await?;
    Ok(Json(state.auth.snapshot().await))
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<AuthSnapshot>> {
    let Json(body) = body?;
    state.auth.sign_in(&body.email, &body.password).await?;
    Ok(Json(state.auth.snapshot().await))
}

async fn sign_out(State(state): State<Arc<AppState>>) -> Result<Json<AuthSnapshot>> {
    state.auth.sign_out().await?;
    Ok(Json(state.auth.snapshot().await))
}

async fn session(State(state): State<Arc<AppState>>) -> Json<AuthSnapshot> {
    Json(state.auth.snapshot().await)
}

async fn clear_error(State(state): State<Arc<AppState>>) -> Json<AuthSnapshot> {
    state.auth.clear_error().await;
    Json(state.auth.snapshot().await)
}
