// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chat_mentor::config::Config;
use chat_mentor::db::{DocumentStore, FirestoreDb};
use chat_mentor::error::AppError;
use chat_mentor::models::{AuthUser, Conversation, ConversationDocument, UserProfile};
use chat_mentor::routes::create_router;
use chat_mentor::services::identity::describe_error_code;
use chat_mentor::services::{CompletionApi, CompletionRequest};
use chat_mentor::AppState;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const EMAIL: &str = "ana@example.com";
pub const PASSWORD: &str = "secret1";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Connect to the Firestore emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

// ─── Fake identity provider ─────────────────────────────────────

/// In-memory accounts keyed by email.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, (String, String)>>,
}

impl FakeIdentity {
    fn user(uid: &str, email: &str) -> AuthUser {
        AuthUser {
            uid: uid.to_string(),
            email: email.to_string(),
            id_token: format!("id-token-{}", uid),
            refresh_token: format!("refresh-token-{}", uid),
        }
    }
}

#[async_trait]
impl chat_mentor::services::IdentityProvider for FakeIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AppError::Identity(
                describe_error_code("EMAIL_EXISTS").to_string(),
            ));
        }
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
        Ok(Self::user(&uid, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((stored, uid)) if stored == password => Ok(Self::user(uid, email)),
            _ => Err(AppError::Identity(
                describe_error_code("INVALID_LOGIN_CREDENTIALS").to_string(),
            )),
        }
    }
}

// ─── Fake document store ────────────────────────────────────────

/// In-memory profiles and conversation documents.
#[derive(Default)]
pub struct MemoryDocuments {
    pub profiles: Mutex<HashMap<String, UserProfile>>,
    pub conversations: Mutex<Vec<ConversationDocument>>,
    offline: AtomicBool,
}

#[allow(dead_code)]
impl MemoryDocuments {
    /// Make every following call fail like an unreachable database.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AppError::Database("Database not connected (offline mode)".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.check_online()?;
        Ok(self.profiles.lock().unwrap().get(uid).cloned())
    }

    async fn set_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.check_online()?;
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn merge_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.set_profile(profile).await
    }

    async fn add_conversation(
        &self,
        document: &ConversationDocument,
    ) -> Result<String, AppError> {
        self.check_online()?;
        let mut conversations = self.conversations.lock().unwrap();
        let id = format!("doc-{}", conversations.len() + 1);
        let mut stored = document.clone();
        stored.id = Some(id.clone());
        conversations.push(stored);
        Ok(id)
    }

    async fn conversations_for_user(&self, uid: &str) -> Result<Vec<Conversation>, AppError> {
        self.check_online()?;
        let mut owned: Vec<ConversationDocument> = self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|doc| doc.user_id == uid)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned.into_iter().map(Conversation::from).collect())
    }
}

// ─── Fake completion API ────────────────────────────────────────

/// Replies from a script, then a fixed default. Records every request.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

pub const DEFAULT_REPLY: &str = "Keep going, you are doing great!";

#[allow(dead_code)]
impl ScriptedCompletion {
    pub fn reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn fail(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionApi for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AppError::Completion(message)),
            None => Ok(DEFAULT_REPLY.to_string()),
        }
    }
}

// ─── Harness ────────────────────────────────────────────────────

/// Test config with snapshots under `dir`.
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::test_default();
    config.data_dir = dir.to_path_buf();
    config
}

/// App state wired to in-memory backends.
#[allow(dead_code)]
pub struct Harness {
    pub state: Arc<AppState>,
    pub identity: Arc<FakeIdentity>,
    pub documents: Arc<MemoryDocuments>,
    pub completion: Arc<ScriptedCompletion>,
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        Self::in_dir(dir)
    }

    /// Build a fresh state over an existing snapshot directory.
    pub fn in_dir(dir: TempDir) -> Self {
        let identity = Arc::new(FakeIdentity::default());
        let documents = Arc::new(MemoryDocuments::default());
        let completion = Arc::new(ScriptedCompletion::default());

        let state = Arc::new(AppState::new(
            test_config(dir.path()),
            identity.clone(),
            documents.clone(),
            completion.clone(),
        ));

        Self {
            state,
            identity,
            documents,
            completion,
            dir,
        }
    }

    /// Create the default account and leave it signed in.
    pub async fn signed_in(self) -> Self {
        self.state
            .auth
            .sign_up(EMAIL, PASSWORD, Some("Ana"))
            .await
            .expect("sign up");
        self
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}

/// Conversation fixture with a single seed message.
#[allow(dead_code)]
pub fn conversation(id: &str, updated_at: i64) -> Conversation {
    Conversation {
        id: id.to_string(),
        title: format!("Chat {}", id),
        messages: vec![chat_mentor::models::Message::system("seed")],
        created_at: updated_at,
        updated_at,
        user_id: "uid-1".to_string(),
    }
}
