// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the push-relay service.
//!
//! Provides [`RelayClient`] which handles request construction and
//! transient error retry for the device/ack/metric endpoints.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use tether_config::model::RelayConfig;
use tether_core::TetherError;
use tracing::{debug, warn};

use crate::types::{
    DeliveryAck, DeviceRegistration, MetricReport, MetricType, RegisterResponse,
    UnregisterRequest,
};

/// HTTP client for push-relay communication.
///
/// Manages connection pooling and retry logic for transient errors
/// (429, 500, 503). All failures map to [`TetherError::Relay`], which the
/// job layer treats as retryable.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl RelayClient {
    /// Creates a new relay client from the `[relay]` config section.
    pub fn new(config: &RelayConfig) -> Result<Self, TetherError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TetherError::Relay {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Registers this device for push delivery.
    pub async fn register_device(
        &self,
        registration: &DeviceRegistration,
    ) -> Result<RegisterResponse, TetherError> {
        let body = self
            .post_json("/v1/devices/register", registration)
            .await?;
        serde_json::from_str(&body).map_err(|e| TetherError::Relay {
            message: format!("failed to parse register response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Removes this device from push delivery.
    pub async fn unregister_device(&self, device_id: &str) -> Result<(), TetherError> {
        let request = UnregisterRequest {
            device_id: device_id.to_string(),
        };
        self.post_json("/v1/devices/unregister", &request).await?;
        Ok(())
    }

    /// Acknowledges delivery of a pushed message.
    pub async fn ack_delivery(&self, ack: &DeliveryAck) -> Result<(), TetherError> {
        self.post_json("/v1/push/ack", ack).await?;
        Ok(())
    }

    /// Reports one delivery-outcome counter increment.
    pub async fn report_metric(
        &self,
        metric_type: MetricType,
        reason: Option<&str>,
    ) -> Result<(), TetherError> {
        let report = MetricReport {
            metric_type,
            reason: reason.map(str::to_string),
        };
        self.post_json("/v1/push/metric", &report).await?;
        Ok(())
    }

    /// Probes the relay's health endpoint.
    pub async fn health(&self) -> Result<bool, TetherError> {
        let url = format!("{}/v1/push/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TetherError::Relay {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(response.status().is_success())
    }

    /// Sends a JSON POST and returns the response body.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second
    /// delay.
    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<String, TetherError> {
        let url = format!("{}{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, path, "retrying relay request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| TetherError::Relay {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, path, "relay response received");

            if status.is_success() {
                return response.text().await.map_err(|e| TetherError::Relay {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let text = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient relay error, will retry");
                last_error = Some(TetherError::Relay {
                    message: format!("relay returned {status}: {text}"),
                    source: None,
                });
                continue;
            }

            return Err(TetherError::Relay {
                message: format!("relay returned {status}: {text}"),
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| TetherError::Relay {
            message: "relay request failed after retries".into(),
            source: None,
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> RelayClient {
        RelayClient::new(&RelayConfig {
            enabled: true,
            base_url: base_url.to_string(),
        })
        .unwrap()
    }

    fn test_registration() -> DeviceRegistration {
        DeviceRegistration {
            user_id: 7,
            device_id: "dev-7".into(),
            fcm_token: "fcm-token".into(),
            app_version: "0.1.0".into(),
            locale: "en-US".into(),
            capabilities: vec!["push".into(), "media".into()],
        }
    }

    #[tokio::test]
    async fn register_device_posts_the_full_payload() {
        let server = MockServer::start().await;

        let expected = serde_json::json!({
            "userId": 7,
            "deviceId": "dev-7",
            "fcmToken": "fcm-token",
            "appVersion": "0.1.0",
            "locale": "en-US",
            "capabilities": ["push", "media"]
        });
        Mock::given(method("POST"))
            .and(path("/v1/devices/register"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"status": "ok", "device_id": "dev-7"}),
            ))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.register_device(&test_registration()).await.unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.device_id, "dev-7");
    }

    #[tokio::test]
    async fn register_device_retries_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/devices/register"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/devices/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"status": "ok", "device_id": "dev-7"}),
            ))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.register_device(&test_registration()).await.unwrap();
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn non_transient_errors_fail_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/devices/unregister"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown device"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.unregister_device("nope").await.unwrap_err();
        assert!(matches!(err, TetherError::Relay { .. }));
        assert!(err.to_string().contains("unknown device"), "got: {err}");
    }

    #[tokio::test]
    async fn ack_sends_epoch_millis() {
        let server = MockServer::start().await;

        let expected = serde_json::json!({
            "deviceId": "dev-7",
            "messageId": 900,
            "deliveredAtEpochMs": 1_700_000_000_000i64
        });
        Mock::given(method("POST"))
            .and(path("/v1/push/ack"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client
            .ack_delivery(&DeliveryAck {
                device_id: "dev-7".into(),
                message_id: 900,
                delivered_at_epoch_ms: 1_700_000_000_000,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn metric_omits_reason_when_absent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/push/metric"))
            .and(body_json(&serde_json::json!({"type": "opened"})))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.report_metric(MetricType::Opened, None).await.unwrap();
    }

    #[tokio::test]
    async fn health_reflects_the_status_code() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/push/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client.health().await.unwrap());
    }
}
