// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth state tests against in-memory backends.

use chat_mentor::error::AppError;
use chat_mentor::models::ProfileUpdate;

mod common;
use common::{Harness, EMAIL, PASSWORD};

// ═══════════════════════════════════════════════════════════════════════════
// SIGN UP / SIGN IN
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_sign_up_creates_profile() {
    let h = Harness::new();

    h.state
        .auth
        .sign_up(EMAIL, PASSWORD, Some("Ana"))
        .await
        .unwrap();

    let snapshot = h.state.auth.snapshot().await;
    assert!(snapshot.is_authenticated);
    assert!(!snapshot.is_loading);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.user.unwrap().uid, "uid-1");

    let profile = snapshot.profile.unwrap();
    assert_eq!(profile.id, "uid-1");
    assert_eq!(profile.email, EMAIL);
    assert_eq!(profile.display_name.as_deref(), Some("Ana"));
    assert!(profile.created_at > 0);

    let stored = h.documents.profiles.lock().unwrap();
    assert_eq!(stored.get("uid-1"), Some(&profile));
}

#[tokio::test]
async fn test_sign_up_without_display_name_stores_empty_name() {
    let h = Harness::new();

    h.state.auth.sign_up(EMAIL, PASSWORD, None).await.unwrap();

    let profile = h.state.auth.profile().await.unwrap();
    assert_eq!(profile.display_name.as_deref(), Some(""));
}

#[tokio::test]
async fn test_sign_up_duplicate_email_records_error() {
    let h = Harness::new().signed_in().await;
    h.state.auth.sign_out().await.unwrap();

    let err = h
        .state
        .auth
        .sign_up(EMAIL, PASSWORD, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Identity(_)));
    let snapshot = h.state.auth.snapshot().await;
    assert!(!snapshot.is_authenticated);
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.error, Some(err.to_string()));
}

#[tokio::test]
async fn test_sign_up_rejects_short_password_before_identity_call() {
    let h = Harness::new();

    let err = h
        .state
        .auth
        .sign_up(EMAIL, "123", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("password"));
    // The account was never created, so a valid sign-up still works
    h.state.auth.sign_up(EMAIL, PASSWORD, None).await.unwrap();
}

#[tokio::test]
async fn test_sign_up_profile_write_failure() {
    let h = Harness::new();
    h.documents.go_offline();

    let err = h
        .state
        .auth
        .sign_up(EMAIL, PASSWORD, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
    assert!(!h.state.auth.snapshot().await.is_authenticated);
}

#[tokio::test]
async fn test_sign_in_loads_profile() {
    let h = Harness::new().signed_in().await;
    h.state.auth.sign_out().await.unwrap();
    assert!(h.state.auth.profile().await.is_none());

    h.state.auth.sign_in(EMAIL, PASSWORD).await.unwrap();

    let snapshot = h.state.auth.snapshot().await;
    assert!(snapshot.is_authenticated);
    assert_eq!(snapshot.profile.unwrap().display_name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn test_sign_in_without_profile_document() {
    let h = Harness::new().signed_in().await;
    h.state.auth.sign_out().await.unwrap();
    h.documents.profiles.lock().unwrap().clear();

    h.state.auth.sign_in(EMAIL, PASSWORD).await.unwrap();

    let snapshot = h.state.auth.snapshot().await;
    assert!(snapshot.is_authenticated);
    assert!(snapshot.profile.is_none());
}

#[tokio::test]
async fn test_sign_in_failure_leaves_unauthenticated() {
    let h = Harness::new();

    let err = h
        .state
        .auth
        .sign_in(EMAIL, "wrong-password")
        .await
        .unwrap_err();

    let snapshot = h.state.auth.snapshot().await;
    assert!(!snapshot.is_authenticated);
    assert!(!snapshot.is_loading);
    assert!(snapshot.user.is_none());
    assert_eq!(snapshot.error.as_deref(), Some("Invalid email or password"));
    assert_eq!(err.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn test_sign_in_rejects_malformed_email() {
    let h = Harness::new();

    let err = h
        .state
        .auth
        .sign_in("not-an-email", PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(h.state.auth.snapshot().await.error.is_some());
}

#[tokio::test]
async fn test_successful_operation_clears_previous_error() {
    let h = Harness::new().signed_in().await;
    h.state.auth.sign_out().await.unwrap();
    let _ = h.state.auth.sign_in(EMAIL, "wrong-password").await;
    assert!(h.state.auth.snapshot().await.error.is_some());

    h.state.auth.sign_in(EMAIL, PASSWORD).await.unwrap();

    assert!(h.state.auth.snapshot().await.error.is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// SIGN OUT / SESSION
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_sign_out_clears_session() {
    let h = Harness::new().signed_in().await;

    h.state.auth.sign_out().await.unwrap();

    let snapshot = h.state.auth.snapshot().await;
    assert!(!snapshot.is_authenticated);
    assert!(snapshot.user.is_none());
    assert!(snapshot.profile.is_none());
    assert!(h.state.auth.current_user().await.is_none());
    assert!(h.state.auth.authenticated_user().await.is_none());
}

#[tokio::test]
async fn test_snapshot_strips_tokens() {
    let h = Harness::new().signed_in().await;

    let json = serde_json::to_value(h.state.auth.snapshot().await).unwrap();

    assert_eq!(json["user"]["uid"], "uid-1");
    assert_eq!(json["user"]["email"], EMAIL);
    assert!(json["user"].get("idToken").is_none());
    assert!(json["user"].get("refreshToken").is_none());
    assert_eq!(json["isAuthenticated"], true);
}

#[tokio::test]
async fn test_clear_error() {
    let h = Harness::new();
    let _ = h.state.auth.sign_in(EMAIL, PASSWORD).await;
    assert!(h.state.auth.snapshot().await.error.is_some());

    h.state.auth.clear_error().await;

    assert!(h.state.auth.snapshot().await.error.is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_update_profile_merges_fields() {
    let h = Harness::new().signed_in().await;

    let update = ProfileUpdate {
        interests: Some(vec!["rust".to_string(), "chess".to_string()]),
        ..Default::default()
    };
    let profile = h.state.auth.update_profile(update).await.unwrap();

    assert_eq!(profile.display_name.as_deref(), Some("Ana"));
    assert_eq!(
        profile.interests,
        Some(vec!["rust".to_string(), "chess".to_string()])
    );
    assert!(profile.last_active.is_some());

    let stored = h.documents.profiles.lock().unwrap();
    assert_eq!(stored.get("uid-1"), Some(&profile));
    drop(stored);
    assert_eq!(h.state.auth.profile().await, Some(profile));
}

#[tokio::test]
async fn test_update_profile_requires_session() {
    let h = Harness::new();

    let err = h
        .state
        .auth
        .update_profile(ProfileUpdate::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized));
    assert_eq!(
        h.state.auth.snapshot().await.error.as_deref(),
        Some("User not authenticated")
    );
}

#[tokio::test]
async fn test_update_profile_rejects_invalid_photo_url() {
    let h = Harness::new().signed_in().await;

    let update = ProfileUpdate {
        photo_url: Some("not a url".to_string()),
        ..Default::default()
    };
    let err = h.state.auth.update_profile(update).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(h.state.auth.profile().await.unwrap().photo_url.is_none());
}

#[tokio::test]
async fn test_update_profile_write_failure_keeps_local_profile() {
    let h = Harness::new().signed_in().await;
    h.documents.go_offline();

    let update = ProfileUpdate {
        display_name: Some("Ana Maria".to_string()),
        ..Default::default()
    };
    let err = h.state.auth.update_profile(update).await.unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
    let profile = h.state.auth.profile().await.unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Ana"));
    assert!(!h.state.auth.snapshot().await.is_loading);
}

#[tokio::test]
async fn test_refresh_user_profile_picks_up_remote_changes() {
    let h = Harness::new().signed_in().await;
    h.documents
        .profiles
        .lock()
        .unwrap()
        .get_mut("uid-1")
        .unwrap()
        .learning_goals = Some(vec!["ownership".to_string()]);

    h.state.auth.refresh_user_profile().await;

    let profile = h.state.auth.profile().await.unwrap();
    assert_eq!(profile.learning_goals, Some(vec!["ownership".to_string()]));
}

#[tokio::test]
async fn test_refresh_user_profile_failure_is_silent() {
    let h = Harness::new().signed_in().await;
    h.documents.go_offline();

    h.state.auth.refresh_user_profile().await;

    let snapshot = h.state.auth.snapshot().await;
    assert!(snapshot.error.is_none());
    assert!(snapshot.profile.is_some());
}

#[tokio::test]
async fn test_refresh_without_user_is_noop() {
    let h = Harness::new();

    h.state.auth.refresh_user_profile().await;

    assert!(h.state.auth.profile().await.is_none());
}
