// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Chat Mentor: a virtual mentor you can talk to.
//!
//! This crate provides the local service behind the chat-mentor UI: the
//! authentication and conversation state containers, their on-device
//! snapshots, and the clients for the identity provider, the document
//! store and the completion API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{CompletionApi, IdentityProvider};
use std::sync::Arc;
use store::{AuthStore, MentorStore, SnapshotStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: Arc<AuthStore>,
    pub mentor: Arc<MentorStore>,
    pub completion: Arc<dyn CompletionApi>,
}

impl AppState {
    /// Wire both state containers to the given backends.
    ///
    /// Snapshots are kept under `config.data_dir`; call [`AppState::restore`]
    /// to load them.
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
        completion: Arc<dyn CompletionApi>,
    ) -> Self {
        let storage = SnapshotStore::new(config.data_dir.clone());

        let auth = Arc::new(AuthStore::new(identity, documents.clone(), storage.clone()));
        let mentor = Arc::new(MentorStore::new(
            auth.clone(),
            completion.clone(),
            documents,
            storage,
            config.system_prompt.clone(),
        ));

        Self {
            config,
            auth,
            mentor,
            completion,
        }
    }

    /// Load both state containers from their on-device snapshots.
    pub async fn restore(&self) {
        self.auth.restore().await;
        self.mentor.restore().await;
    }
}
