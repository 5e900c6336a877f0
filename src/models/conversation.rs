// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Conversation and message models.

use crate::time_utils::now_millis;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat turn. Messages are never edited once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation as held on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    /// Always starts with exactly one system message.
    pub messages: Vec<Message>,
    /// Unix epoch milliseconds
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every append
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub updated_at: i64,
    pub user_id: String,
}

impl Conversation {
    /// Start a conversation seeded with a single system message.
    pub fn new(title: impl Into<String>, user_id: impl Into<String>, seed: Message) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: vec![seed],
            created_at: now,
            updated_at: now,
            user_id: user_id.into(),
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// Refresh `updated_at`. A clock that went backwards never lowers it.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }

    /// Shape written to the document store, owned by `user_id`.
    pub fn to_document(&self, user_id: &str) -> ConversationDocument {
        ConversationDocument {
            id: None,
            title: self.title.clone(),
            messages: self.messages.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            user_id: user_id.to_string(),
        }
    }
}

/// Conversation as stored in the `conversations` collection.
///
/// The document id is not a stored field; Firestore reports it through
/// `_firestore_id` on reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDocument {
    #[serde(alias = "_firestore_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: i64,
    pub updated_at: i64,
    pub user_id: String,
}

impl From<ConversationDocument> for Conversation {
    fn from(doc: ConversationDocument) -> Self {
        Self {
            id: doc.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: doc.title,
            messages: doc.messages,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            user_id: doc.user_id,
        }
    }
}
