// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline sync engine for the Tether core.
//!
//! Owns the canonical local chat/message state, merges local pending writes
//! with gateway results, and emits sync-state events through the bridge.

pub mod engine;
pub mod ids;

pub use engine::{SyncEngine, SyncStatus};
pub use ids::LocalIdGenerator;
