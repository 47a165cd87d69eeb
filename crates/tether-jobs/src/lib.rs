// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background jobs for the Tether core.
//!
//! Schedules periodic sync passes and serialized push processing, with
//! exponential retry backoff and network gating.

pub mod retry;
pub mod scheduler;

pub use retry::{JobOutcome, RetryPolicy};
pub use scheduler::JobScheduler;
