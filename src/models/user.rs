//! User identity and profile models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// User profile stored in Firestore (`users/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Identity provider uid (also used as document ID)
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Unix epoch milliseconds
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_goals: Option<Vec<String>>,
    /// Unix epoch milliseconds of the last profile update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub last_active: Option<i64>,
}

/// Partial profile sent by the profile screen. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    #[validate(url)]
    pub photo_url: Option<String>,
    #[validate(length(max = 20))]
    pub interests: Option<Vec<String>>,
    #[validate(length(max = 20))]
    pub learning_goals: Option<Vec<String>>,
}

impl ProfileUpdate {
    /// Merge the present fields into `profile`.
    pub fn apply_to(self, profile: &mut UserProfile) {
        if let Some(display_name) = self.display_name {
            profile.display_name = Some(display_name);
        }
        if let Some(photo_url) = self.photo_url {
            profile.photo_url = Some(photo_url);
        }
        if let Some(interests) = self.interests {
            profile.interests = Some(interests);
        }
        if let Some(learning_goals) = self.learning_goals {
            profile.learning_goals = Some(learning_goals);
        }
    }
}

/// Email/password pair checked before reaching the identity provider.
#[derive(Debug, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

/// Signed-in identity as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
}

/// Public view of [`AuthUser`] without the session tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
}

impl From<&AuthUser> for SessionUser {
    fn from(user: &AuthUser) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
        }
    }
}
