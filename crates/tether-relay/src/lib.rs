// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the push-relay service.
//!
//! The relay is a peer HTTP service handling device registration, delivery
//! acks, and delivery metrics. This crate implements the consumer half of
//! that contract; the relay itself lives elsewhere.

pub mod client;
pub mod types;

pub use client::RelayClient;
pub use types::{DeliveryAck, DeviceRegistration, MetricType, RegisterResponse};
