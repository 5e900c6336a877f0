// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client (Firebase Authentication REST API).
//!
//! Handles:
//! - Email/password account creation
//! - Email/password sign-in
//! - Mapping provider error codes to readable messages

use crate::error::AppError;
use crate::models::AuthUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Email/password identity operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return the signed-in identity.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AppError>;

    /// Authenticate an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AppError>;

    /// End the session for `user`.
    ///
    /// The REST API keeps no server-side session, so the default only logs.
    async fn sign_out(&self, user: &AuthUser) -> Result<(), AppError> {
        tracing::debug!(uid = %user.uid, "Session dropped locally");
        Ok(())
    }
}

/// Firebase Auth REST client.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FirebaseAuthClient {
    /// Create a client for the given Web API key.
    ///
    /// `base_url` is normally `https://identitytoolkit.googleapis.com/v1`;
    /// the Auth emulator serves the same paths under its own host.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// POST an email/password payload to `accounts:{action}`.
    async fn password_request(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AppError> {
        let url = format!("{}/accounts:{}", self.base_url, action);

        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, action, "Identity request failed");
                AppError::Identity("Could not reach the authentication service".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_default();

            tracing::warn!(
                status = %status,
                code = %code,
                action,
                "Identity provider rejected request"
            );
            return Err(AppError::Identity(describe_error_code(&code).to_string()));
        }

        let payload: PasswordResponse = response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Malformed identity response: {}", e)))?;

        Ok(AuthUser {
            uid: payload.local_id,
            email: payload.email.unwrap_or_else(|| email.to_string()),
            id_token: payload.id_token,
            refresh_token: payload.refresh_token,
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let user = self.password_request("signUp", email, password).await?;
        tracing::info!(uid = %user.uid, "Account created");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let user = self
            .password_request("signInWithPassword", email, password)
            .await?;
        tracing::info!(uid = %user.uid, "Signed in");
        Ok(user)
    }
}

/// Map a provider error code to a message fit for the UI.
///
/// Codes may carry a suffix (`WEAK_PASSWORD : Password should be ...`).
pub fn describe_error_code(code: &str) -> &'static str {
    let code = code.split(" : ").next().unwrap_or_default().trim();
    match code {
        "EMAIL_EXISTS" => "An account already exists for this email",
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Invalid email or password"
        }
        "INVALID_EMAIL" => "The email address is invalid",
        "WEAK_PASSWORD" => "Password should be at least 6 characters",
        "USER_DISABLED" => "This account has been disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later",
        "OPERATION_NOT_ALLOWED" => "Email/password sign-in is disabled",
        _ => "Authentication failed",
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
