// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Conversation ("mentor") state.
//!
//! Mediates between the on-device conversation list, the document store and
//! the completion API. Local state is updated first, then the remote calls
//! run. Failures are recorded on the state and not returned; the UI reads
//! them from `error`.
//!
//! The state lock is never held across a network call, so overlapping
//! sends each issue their own completion request.

use crate::db::DocumentStore;
use crate::models::{Conversation, Message};
use crate::services::{CompletionApi, CompletionRequest};
use crate::store::{AuthStore, SnapshotStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Snapshot key for the persisted conversation state.
pub const MENTOR_STORAGE_KEY: &str = "mentor-storage";

pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

pub const ERR_NOT_AUTHENTICATED: &str = "User not authenticated";
pub const ERR_NO_CONVERSATION: &str = "No conversation selected";
pub const ERR_EMPTY_MESSAGE: &str = "Message cannot be empty";

/// Conversation state as shown to the UI.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MentorState {
    pub conversations: Vec<Conversation>,
    pub current_conversation: Option<Conversation>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl MentorState {
    /// Write `conversation` into the list (front if new) and make it current.
    fn put_current(&mut self, conversation: &Conversation) {
        match self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
        {
            Some(entry) => *entry = conversation.clone(),
            None => self.conversations.insert(0, conversation.clone()),
        }
        self.current_conversation = Some(conversation.clone());
    }

    fn is_current(&self, id: &str) -> bool {
        self.current_conversation
            .as_ref()
            .is_some_and(|c| c.id == id)
    }
}

/// Part of the conversation state that survives a restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMentorState {
    pub conversations: Vec<Conversation>,
    pub current_conversation: Option<Conversation>,
}

/// Conversation state container.
pub struct MentorStore {
    auth: Arc<AuthStore>,
    completion: Arc<dyn CompletionApi>,
    documents: Arc<dyn DocumentStore>,
    storage: SnapshotStore,
    system_prompt: String,
    state: RwLock<MentorState>,
    /// Held across snapshot and write so an older snapshot never lands last.
    persist_lock: Mutex<()>,
}

impl MentorStore {
    pub fn new(
        auth: Arc<AuthStore>,
        completion: Arc<dyn CompletionApi>,
        documents: Arc<dyn DocumentStore>,
        storage: SnapshotStore,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            completion,
            documents,
            storage,
            system_prompt: system_prompt.into(),
            state: RwLock::new(MentorState::default()),
            persist_lock: Mutex::new(()),
        }
    }

    /// Reload the persisted conversation list, if any.
    pub async fn restore(&self) {
        let Some(stored) = self
            .storage
            .load::<StoredMentorState>(MENTOR_STORAGE_KEY)
            .await
        else {
            return;
        };

        let mut state = self.state.write().await;
        state.conversations = stored.conversations;
        state.current_conversation = stored.current_conversation;

        tracing::info!(
            conversations = state.conversations.len(),
            "Conversation state restored"
        );
    }

    pub async fn snapshot(&self) -> MentorState {
        self.state.read().await.clone()
    }

    // ─── Operations ──────────────────────────────────────────────

    /// Start a conversation seeded with the system prompt and make it current.
    pub async fn create_conversation(&self, title: Option<&str>) {
        let Some(user) = self.auth.current_user().await else {
            self.record_error(ERR_NOT_AUTHENTICATED).await;
            return;
        };

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_TITLE);
        let conversation =
            Conversation::new(title, user.uid, Message::system(self.system_prompt.as_str()));

        tracing::debug!(conversation_id = %conversation.id, "Conversation created");

        {
            let mut state = self.state.write().await;
            state.conversations.insert(0, conversation.clone());
            state.current_conversation = Some(conversation);
        }
        self.persist().await;
    }

    /// Make the conversation with `id` current. Unknown ids clear the selection.
    pub async fn select_conversation(&self, id: &str) {
        {
            let mut state = self.state.write().await;
            let found = state.conversations.iter().find(|c| c.id == id).cloned();
            if found.is_none() {
                tracing::debug!(conversation_id = id, "Selected conversation not found");
            }
            state.current_conversation = found;
        }
        self.persist().await;
    }

    /// Append a user turn, ask the mentor for a reply, append it, save remotely.
    pub async fn send_message(&self, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            self.record_error(ERR_EMPTY_MESSAGE).await;
            return;
        }

        // 1. Optimistic local append
        let (conversation_id, messages) = {
            let mut state = self.state.write().await;
            let Some(mut conversation) = state.current_conversation.clone() else {
                state.error = Some(ERR_NO_CONVERSATION.to_string());
                drop(state);
                self.persist().await;
                return;
            };

            state.is_loading = true;
            state.error = None;

            conversation.push_message(Message::user(content));
            state.put_current(&conversation);
            (conversation.id, conversation.messages)
        };
        self.persist().await;

        // 2. Completion round-trip
        let reply = match self
            .completion
            .complete(CompletionRequest::new(messages))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Mentor reply failed"
                );
                {
                    let mut state = self.state.write().await;
                    state.is_loading = false;
                    state.error = Some(e.to_string());
                }
                self.persist().await;
                return;
            }
        };

        // 3. Append the reply to the latest copy of the conversation
        let finished = {
            let mut state = self.state.write().await;
            state.is_loading = false;

            let updated = state
                .conversations
                .iter_mut()
                .find(|c| c.id == conversation_id)
                .map(|conversation| {
                    conversation.push_message(Message::assistant(reply));
                    conversation.clone()
                });

            match &updated {
                Some(conversation) if state.is_current(&conversation_id) => {
                    state.current_conversation = Some(conversation.clone());
                }
                Some(_) => {}
                None => {
                    tracing::warn!(
                        conversation_id = %conversation_id,
                        "Conversation removed before the reply arrived; reply dropped"
                    );
                }
            }
            updated
        };
        self.persist().await;

        // 4. Remote copy
        if let Some(conversation) = finished {
            self.save_conversation(&conversation).await;
        }
    }

    /// Replace the local list with the signed-in user's remote conversations.
    pub async fn fetch_conversations(&self) {
        let Some(user) = self.auth.current_user().await else {
            return;
        };

        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let result = self.documents.conversations_for_user(&user.uid).await;

        {
            let mut state = self.state.write().await;
            state.is_loading = false;
            match result {
                Ok(conversations) => {
                    tracing::info!(
                        uid = %user.uid,
                        count = conversations.len(),
                        "Conversations fetched"
                    );
                    state.current_conversation = conversations.first().cloned();
                    state.conversations = conversations;
                }
                Err(e) => {
                    tracing::warn!(uid = %user.uid, error = %e, "Failed to fetch conversations");
                    state.error = Some(e.to_string());
                }
            }
        }
        self.persist().await;
    }

    /// Store a copy of `conversation` for the signed-in user.
    ///
    /// Each call adds a new remote document. Failures are logged only.
    pub async fn save_conversation(&self, conversation: &Conversation) {
        let Some(user) = self.auth.current_user().await else {
            tracing::warn!(
                conversation_id = %conversation.id,
                "Not saving conversation: {}",
                ERR_NOT_AUTHENTICATED
            );
            return;
        };

        match self
            .documents
            .add_conversation(&conversation.to_document(&user.uid))
            .await
        {
            Ok(document_id) => tracing::debug!(
                conversation_id = %conversation.id,
                document_id = %document_id,
                "Conversation saved"
            ),
            Err(e) => tracing::error!(
                conversation_id = %conversation.id,
                error = %e,
                "Failed to save conversation"
            ),
        }
    }

    /// Remove a conversation from the device.
    ///
    /// If it was current, the first remaining conversation becomes current.
    /// Remote copies are left in place.
    pub async fn delete_conversation(&self, id: &str) {
        {
            let mut state = self.state.write().await;
            state.error = None;
            state.conversations.retain(|c| c.id != id);
            if state.is_current(id) {
                state.current_conversation = state.conversations.first().cloned();
            }
        }
        tracing::debug!(conversation_id = id, "Conversation deleted locally");
        self.persist().await;
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    // ─── Helpers ─────────────────────────────────────────────────

    async fn record_error(&self, message: &str) {
        self.state.write().await.error = Some(message.to_string());
        tracing::debug!(error = message, "Mentor operation rejected");
    }

    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        let stored = {
            let state = self.state.read().await;
            StoredMentorState {
                conversations: state.conversations.clone(),
                current_conversation: state.current_conversation.clone(),
            }
        };

        if let Err(e) = self.storage.save(MENTOR_STORAGE_KEY, &stored).await {
            tracing::warn!(error = %e, "Failed to persist conversation state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(id: &str, updated_at: i64) -> Conversation {
        Conversation {
            id: id.to_string(),
            title: format!("Chat {}", id),
            messages: vec![Message::system("seed")],
            created_at: updated_at,
            updated_at,
            user_id: "uid-1".to_string(),
        }
    }

    #[test]
    fn test_put_current_replaces_existing_entry() {
        let mut state = MentorState {
            conversations: vec![conversation("1", 100), conversation("2", 200)],
            ..Default::default()
        };

        let mut changed = conversation("2", 300);
        changed.messages.push(Message::user("hi"));
        state.put_current(&changed);

        assert_eq!(state.conversations.len(), 2);
        assert_eq!(state.conversations[1].messages.len(), 2);
        assert!(state.is_current("2"));
    }

    #[test]
    fn test_put_current_inserts_unknown_at_front() {
        let mut state = MentorState {
            conversations: vec![conversation("1", 100)],
            ..Default::default()
        };

        state.put_current(&conversation("9", 50));

        assert_eq!(state.conversations[0].id, "9");
        assert_eq!(state.conversations.len(), 2);
    }
}
