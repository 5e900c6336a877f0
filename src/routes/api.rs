// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes for the signed-in user.

use crate::error::{AppError, Result};
use crate::models::{AuthUser, ProfileUpdate, UserProfile};
use crate::services::generate_suggestions;
use crate::store::AuthSnapshot;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).patch(update_profile))
        .route("/api/profile/refresh", post(refresh_profile))
        .route("/api/suggestions", get(get_suggestions))
}

// ─── User Profile ────────────────────────────────────────────

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .auth
        .profile()
        .await
        .ok_or_else(|| AppError::NotFound(format!("Profile for {} not loaded", user.uid)))?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    update: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<UserProfile>> {
    let Json(update) = update?;
    let profile = state.auth.update_profile(update).await?;
    Ok(Json(profile))
}

async fn refresh_profile(State(state): State<Arc<AppState>>) -> Json<AuthSnapshot> {
    state.auth.refresh_user_profile().await;
    Json(state.auth.snapshot().await)
}

// ─── Suggestions ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

/// Learning suggestions built from the user's interests and goals.
async fn get_suggestions(State(state): State<Arc<AppState>>) -> Json<SuggestionsResponse> {
    let context = state
        .auth
        .profile()
        .await
        .map(|profile| suggestion_context(&profile))
        .unwrap_or_default();

    let suggestions = generate_suggestions(state.completion.as_ref(), &context).await;
    Json(SuggestionsResponse { suggestions })
}

fn suggestion_context(profile: &UserProfile) -> String {
    let mut parts = Vec::new();
    if let Some(name) = profile.display_name.as_deref().filter(|n| !n.is_empty()) {
        parts.push(format!("Name: {}", name));
    }
    if let Some(interests) = profile.interests.as_ref().filter(|v| !v.is_empty()) {
        parts.push(format!("Interests: {}", interests.join(", ")));
    }
    if let Some(goals) = profile.learning_goals.as_ref().filter(|v| !v.is_empty()) {
        parts.push(format!("Learning goals: {}", goals.join(", ")));
    }
    parts.join(". ")
}
