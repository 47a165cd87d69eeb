// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tether local-first chat sync core.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Tether workspace. The sync engine, media
//! cache, and job scheduler all build on the seams defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TetherError;
pub use types::{
    CachedMedia, ChatMessage, Dialog, DialogSnapshot, IncomingMessage, MessageStatus,
    PushPayload, SyncCheckpoint,
};

// Re-export the collaborator traits at crate root.
pub use traits::{MediaStore, NetworkMonitor, RemoteGateway};
