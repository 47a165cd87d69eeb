// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switchable network monitor for scheduler tests.

use tether_core::NetworkMonitor;
use tokio::sync::watch;

/// A [`NetworkMonitor`] whose state tests flip at will.
pub struct StubNetwork {
    state: watch::Sender<bool>,
}

impl StubNetwork {
    pub fn new(online: bool) -> Self {
        Self {
            state: watch::channel(online).0,
        }
    }

    pub fn set_online(&self, online: bool) {
        self.state.send_replace(online);
    }
}

impl NetworkMonitor for StubNetwork {
    fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}
