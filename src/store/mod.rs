// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side state containers and their on-device snapshots.

pub mod auth;
pub mod mentor;
pub mod persist;

pub use auth::{AuthSnapshot, AuthStore};
pub use mentor::{MentorState, MentorStore};
pub use persist::SnapshotStore;
