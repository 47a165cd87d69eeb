// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stub adapters and an end-to-end harness for Tether tests.
//!
//! `StubGateway` scripts remote behavior, `StubNetwork` flips connectivity,
//! and `Harness` assembles the whole core over a temp database.

pub mod harness;
pub mod stub_gateway;
pub mod stub_network;

pub use harness::Harness;
pub use stub_gateway::StubGateway;
pub use stub_network::StubNetwork;
