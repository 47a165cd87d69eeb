// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the sync core and its external collaborators.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility; the
//! composition root hands `Arc<dyn ...>` handles to every consumer.

pub mod gateway;
pub mod media_store;
pub mod network;

pub use gateway::RemoteGateway;
pub use media_store::MediaStore;
pub use network::NetworkMonitor;
