// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network availability monitor consumed by the job scheduler.

use tokio::sync::watch;

/// Reports whether the device currently has network connectivity.
///
/// The periodic sync job gates on `is_online`; the scheduler also forwards
/// state changes to the UI as `NETWORK_STATE` bridge events.
pub trait NetworkMonitor: Send + Sync {
    /// Current connectivity, best effort.
    fn is_online(&self) -> bool;

    /// Subscribes to connectivity changes. The receiver's initial value is
    /// the state at subscription time.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
