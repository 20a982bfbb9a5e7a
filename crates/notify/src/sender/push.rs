//! Push reminder delivery via an HTTP push gateway.
//!
//! [`HttpPushSender`] owns the device-subscription lookup: it loads the
//! user's non-revoked subscriptions and POSTs one JSON payload per device to
//! the subscription's gateway endpoint. A push counts as delivered when at
//! least one device accepted it.

use std::time::Duration;

use tandem_core::types::DbId;
use tandem_db::repositories::PushSubscriptionRepo;
use tandem_db::DbPool;

use super::{PushReceipt, PushSender, SendError};

/// HTTP request timeout for a single device delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// PushGatewayConfig
// ---------------------------------------------------------------------------

/// Configuration for the push gateway client.
#[derive(Debug, Clone)]
pub struct PushGatewayConfig {
    /// Bearer token presented to the gateway, when it requires one.
    pub api_key: Option<String>,
}

impl PushGatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `PUSH_GATEWAY_ENABLED` is not `true`, signalling
    /// that push delivery is not configured.
    ///
    /// | Variable               | Required | Default |
    /// |------------------------|----------|---------|
    /// | `PUSH_GATEWAY_ENABLED` | yes      | —       |
    /// | `PUSH_GATEWAY_KEY`     | no       | —       |
    pub fn from_env() -> Option<Self> {
        let enabled = std::env::var("PUSH_GATEWAY_ENABLED").ok()?;
        if enabled != "true" {
            return None;
        }
        Some(Self {
            api_key: std::env::var("PUSH_GATEWAY_KEY").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// HttpPushSender
// ---------------------------------------------------------------------------

/// Sends push notifications through the per-device gateway endpoints.
pub struct HttpPushSender {
    pool: DbPool,
    client: reqwest::Client,
    config: PushGatewayConfig,
}

impl HttpPushSender {
    /// Create a new sender with a pre-configured HTTP client.
    pub fn new(pool: DbPool, config: PushGatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            pool,
            client,
            config,
        }
    }

    /// Create a sender from the environment, or `None` when push delivery
    /// is not configured.
    pub fn from_env(pool: DbPool) -> Option<Self> {
        PushGatewayConfig::from_env().map(|config| Self::new(pool, config))
    }

    /// Execute a single device POST and check the response status.
    async fn push_to_device(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<(), SendError> {
        let mut request = self.client.post(endpoint).json(payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SendError::Other(format!(
                "Push gateway returned HTTP {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PushSender for HttpPushSender {
    async fn send(
        &self,
        user_id: DbId,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> Result<PushReceipt, SendError> {
        let subscriptions = PushSubscriptionRepo::list_active_for_user(&self.pool, user_id).await?;

        let mut receipt = PushReceipt::default();
        if subscriptions.is_empty() {
            receipt.errors.push("no registered devices".to_string());
            return Ok(receipt);
        }

        for subscription in &subscriptions {
            let payload = serde_json::json!({
                "title": title,
                "body": body,
                "data": data,
                "auth": subscription.auth,
            });
            match self.push_to_device(&subscription.endpoint, &payload).await {
                Ok(()) => receipt.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        user_id,
                        subscription_id = subscription.id,
                        error = %e,
                        "Push delivery to device failed"
                    );
                    receipt
                        .errors
                        .push(format!("device {}: {e}", subscription.id));
                }
            }
        }

        tracing::debug!(
            user_id,
            delivered = receipt.delivered,
            failed = receipt.errors.len(),
            "Push fan-out complete"
        );
        Ok(receipt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
