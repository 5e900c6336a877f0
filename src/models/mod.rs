// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod conversation;
pub mod user;

pub use conversation::{Conversation, ConversationDocument, Message, Role};
pub use user::{AuthUser, Credentials, ProfileUpdate, SessionUser, UserProfile};
