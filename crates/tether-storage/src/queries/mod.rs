// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. All functions accept `&Database` and go through the
//! single writer thread.

pub mod dialogs;
pub mod media;
pub mod messages;
pub mod sync_state;
