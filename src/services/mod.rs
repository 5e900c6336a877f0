// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - clients for the managed backends.

pub mod completion;
pub mod identity;

pub use completion::{generate_suggestions, CompletionApi, CompletionRequest, OpenAiClient};
pub use identity::{FirebaseAuthClient, IdentityProvider};
