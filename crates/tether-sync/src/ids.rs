// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local message identifier generation.
//!
//! Identifiers are wall-clock derived (epoch milliseconds) so they stay
//! informative for ordering, but are pushed through an atomic
//! `max(now, last + 1)` so rapid concurrent sends can never collide within
//! a process.

use std::sync::atomic::{AtomicI64, Ordering};

use tether_core::types::now_ms;

/// Monotonic, collision-free local id source.
pub struct LocalIdGenerator {
    last: AtomicI64,
}

impl LocalIdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Next identifier: current wall clock, bumped past the previous id.
    pub fn next_id(&self) -> i64 {
        let now = now_ms();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for LocalIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn ids_are_strictly_increasing() {
        let generator = LocalIdGenerator::new();
        let mut last = 0;
        for _ in 0..10_000 {
            let id = generator.next_id();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn concurrent_generation_never_collides() {
        let generator = Arc::new(LocalIdGenerator::new());
        let mut threads = Vec::new();
        for _ in 0..8 {
            let generator = generator.clone();
            threads.push(std::thread::spawn(move || {
                (0..1_000).map(|_| generator.next_id()).collect::<Vec<i64>>()
            }));
        }

        let mut seen = HashSet::new();
        for thread in threads {
            for id in thread.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
    }

    #[test]
    fn ids_track_wall_clock() {
        let generator = LocalIdGenerator::new();
        let before = now_ms();
        let id = generator.next_id();
        assert!(id >= before);
    }
}
