//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{Conversation, ConversationDocument, UserProfile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// User profiles (keyed by identity uid)
    pub const USERS: &str = "users";
    /// Conversation copies, one document per save
    pub const CONVERSATIONS: &str = "conversations";
}

/// Per-user structured record storage used by the state containers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a profile by identity uid.
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError>;

    /// Write a profile, replacing any existing document.
    async fn set_profile(&self, profile: &UserProfile) -> Result<(), AppError>;

    /// Write the fields present on `profile`, keeping any others on the document.
    async fn merge_profile(&self, profile: &UserProfile) -> Result<(), AppError>;

    /// Store a new conversation document and return its generated id.
    ///
    /// Every call creates a new document; nothing is upserted.
    async fn add_conversation(&self, document: &ConversationDocument)
        -> Result<String, AppError>;

    /// All conversations owned by `uid`, most recently updated first.
    async fn conversations_for_user(&self, uid: &str) -> Result<Vec<Conversation>, AppError>;
}
