// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication state.
//!
//! Holds the signed-in identity and profile. Every operation records a
//! failure as a string on the state and also returns it to the caller.

use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::{AuthUser, Credentials, ProfileUpdate, SessionUser, UserProfile};
use crate::services::IdentityProvider;
use crate::store::SnapshotStore;
use crate::time_utils::now_millis;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Snapshot key for the persisted auth state.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";

#[derive(Debug, Default)]
struct AuthState {
    user: Option<AuthUser>,
    profile: Option<UserProfile>,
    is_loading: bool,
    error: Option<String>,
    is_authenticated: bool,
}

/// Part of the auth state that survives a restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAuthState {
    pub user: Option<AuthUser>,
    pub profile: Option<UserProfile>,
    pub is_authenticated: bool,
}

/// Auth state as shown to the UI (session tokens stripped).
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub user: Option<SessionUser>,
    pub profile: Option<UserProfile>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_authenticated: bool,
}

/// Authentication state container.
pub struct AuthStore {
    identity: Arc<dyn IdentityProvider>,
    documents: Arc<dyn DocumentStore>,
    storage: SnapshotStore,
    state: RwLock<AuthState>,
    persist_lock: Mutex<()>,
}

impl AuthStore {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
        storage: SnapshotStore,
    ) -> Self {
        Self {
            identity,
            documents,
            storage,
            state: RwLock::new(AuthState::default()),
            persist_lock: Mutex::new(()),
        }
    }

    /// Reload the persisted session, if any.
    pub async fn restore(&self) {
        let Some(stored) = self.storage.load::<StoredAuthState>(AUTH_STORAGE_KEY).await else {
            return;
        };

        let mut state = self.state.write().await;
        state.is_authenticated = stored.is_authenticated && stored.user.is_some();
        state.user = stored.user;
        state.profile = stored.profile;

        tracing::info!(
            authenticated = state.is_authenticated,
            "Auth state restored"
        );
    }

    pub async fn snapshot(&self) -> AuthSnapshot {
        let state = self.state.read().await;
        AuthSnapshot {
            user: state.user.as_ref().map(SessionUser::from),
            profile: state.profile.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            is_authenticated: state.is_authenticated,
        }
    }

    /// The signed-in identity, whether or not a profile is loaded.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.state.read().await.user.clone()
    }

    /// The signed-in identity, only while the session counts as authenticated.
    pub async fn authenticated_user(&self) -> Option<AuthUser> {
        let state = self.state.read().await;
        if state.is_authenticated {
            state.user.clone()
        } else {
            None
        }
    }

    pub async fn profile(&self) -> Option<UserProfile> {
        self.state.read().await.profile.clone()
    }

    // ─── Operations ──────────────────────────────────────────────

    /// Create an account and its profile document.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<(), AppError> {
        self.begin().await;

        match self.create_account(email, password, display_name).await {
            Ok((user, profile)) => {
                {
                    let mut state = self.state.write().await;
                    state.user = Some(user);
                    state.profile = Some(profile);
                    state.is_authenticated = true;
                    state.is_loading = false;
                }
                self.persist().await;
                Ok(())
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<(AuthUser, UserProfile), AppError> {
        let credentials = Credentials::new(email, password);
        credentials.validate()?;

        let user = self
            .identity
            .sign_up(&credentials.email, &credentials.password)
            .await?;

        let profile = UserProfile {
            id: user.uid.clone(),
            email: if user.email.is_empty() {
                credentials.email.clone()
            } else {
                user.email.clone()
            },
            display_name: Some(display_name.unwrap_or_default().to_string()),
            photo_url: None,
            created_at: now_millis(),
            interests: None,
            learning_goals: None,
            last_active: None,
        };

        self.documents.set_profile(&profile).await?;
        Ok((user, profile))
    }

    /// Authenticate and load the stored profile.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AppError> {
        self.begin().await;

        let credentials = Credentials::new(email, password);
        let result = match credentials.validate() {
            Ok(()) => {
                self.identity
                    .sign_in(&credentials.email, &credentials.password)
                    .await
            }
            Err(e) => Err(e.into()),
        };

        let user = match result {
            Ok(user) => user,
            Err(e) => return Err(self.fail(e).await),
        };

        let profile = self.load_profile(&user.uid).await;

        {
            let mut state = self.state.write().await;
            state.user = Some(user);
            state.profile = profile;
            state.is_authenticated = true;
            state.is_loading = false;
        }
        self.persist().await;
        Ok(())
    }

    /// Drop the session and the cached profile.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.begin().await;

        if let Some(user) = self.current_user().await {
            if let Err(e) = self.identity.sign_out(&user).await {
                return Err(self.fail(e).await);
            }
        }

        {
            let mut state = self.state.write().await;
            state.user = None;
            state.profile = None;
            state.is_authenticated = false;
            state.is_loading = false;
        }
        self.persist().await;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Merge `update` into the profile and write it back.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, AppError> {
        let (user, profile) = {
            let state = self.state.read().await;
            (state.user.clone(), state.profile.clone())
        };

        let (Some(_), Some(mut profile)) = (user, profile) else {
            return Err(self.fail(AppError::Unauthorized).await);
        };

        if let Err(e) = update.validate() {
            return Err(self.fail(e.into()).await);
        }

        self.begin().await;

        update.apply_to(&mut profile);
        profile.last_active = Some(now_millis());

        if let Err(e) = self.documents.merge_profile(&profile).await {
            return Err(self.fail(e).await);
        }

        {
            let mut state = self.state.write().await;
            state.profile = Some(profile.clone());
            state.is_loading = false;
        }
        self.persist().await;
        Ok(profile)
    }

    /// Reload the profile document for the signed-in user.
    ///
    /// No-op without a user. Failures are logged only.
    pub async fn refresh_user_profile(&self) {
        let Some(user) = self.current_user().await else {
            return;
        };

        if let Some(profile) = self.load_profile(&user.uid).await {
            self.state.write().await.profile = Some(profile);
            self.persist().await;
        }
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    // ─── Helpers ─────────────────────────────────────────────────

    async fn load_profile(&self, uid: &str) -> Option<UserProfile> {
        match self.documents.get_profile(uid).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(uid, error = %e, "Failed to refresh user profile");
                None
            }
        }
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    /// Record `err` on the state and hand it back for the caller to return.
    async fn fail(&self, err: AppError) -> AppError {
        {
            let mut state = self.state.write().await;
            state.is_loading = false;
            state.error = Some(err.to_string());
        }
        tracing::warn!(error = %err, "Auth operation failed");
        err
    }

    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        let stored = {
            let state = self.state.read().await;
            StoredAuthState {
                user: state.user.clone(),
                profile: state.profile.clone(),
                is_authenticated: state.is_authenticated,
            }
        };

        if let Err(e) = self.storage.save(AUTH_STORAGE_KEY, &stored).await {
            tracing::warn!(error = %e, "Failed to persist auth state");
        }
    }
}
