// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the push-relay HTTP contract.
//!
//! Request bodies use camelCase keys; the register response uses snake_case
//! `device_id`. Both are fixed by the relay service, not by this crate.

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/devices/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    pub user_id: i64,
    pub device_id: String,
    pub fcm_token: String,
    pub app_version: String,
    pub locale: String,
    pub capabilities: Vec<String>,
}

/// Response of `POST /v1/devices/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub status: String,
    pub device_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnregisterRequest {
    pub device_id: String,
}

/// Body of `POST /v1/push/ack`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAck {
    pub device_id: String,
    pub message_id: i64,
    pub delivered_at_epoch_ms: i64,
}

/// Delivery counter categories accepted by `POST /v1/push/metric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Sent,
    Opened,
    Retried,
    Failed,
}

#[derive(Debug, Serialize)]
pub(crate) struct MetricReport {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
