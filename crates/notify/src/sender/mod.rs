//! Channel sender seams and production implementations.
//!
//! The dispatcher talks to channels only through the [`EmailSender`] and
//! [`PushSender`] traits, so tests substitute doubles and the concrete
//! transports stay swappable. Production implementations live in
//! [`email`] (SMTP via lettre) and [`push`] (HTTP push gateway via reqwest).

use tandem_core::types::DbId;

pub mod email;
pub mod push;

pub use email::{EmailConfig, SmtpEmailSender};
pub use push::{HttpPushSender, PushGatewayConfig};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for channel send failures.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The channel has no transport configured in this deployment.
    #[error("{0} delivery is not configured")]
    NotConfigured(&'static str),

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The push subscription lookup failed.
    #[error("Subscription lookup failed: {0}")]
    Storage(#[from] sqlx::Error),

    /// Any other failure, used by test doubles and gateway error bodies.
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Sends one email to one address.
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError>;
}

/// Per-user push outcome: a user may have several registered devices, and
/// the push counts as delivered when at least one accepted it.
#[derive(Debug, Clone, Default)]
pub struct PushReceipt {
    /// Number of devices that accepted the push.
    pub delivered: usize,
    /// Per-device failure messages.
    pub errors: Vec<String>,
}

impl PushReceipt {
    /// Whether the push reached at least one device.
    pub fn is_delivered(&self) -> bool {
        self.delivered > 0
    }
}

/// Sends one push notification to all of a user's registered devices.
///
/// The device-subscription lookup is owned by the implementation; callers
/// pass only the user ID.
#[async_trait::async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        user_id: DbId,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> Result<PushReceipt, SendError>;
}

// ---------------------------------------------------------------------------
// Disabled transports
// ---------------------------------------------------------------------------

/// Stand-in sender for channels with no transport configured.
///
/// Keeps dispatcher wiring total: a deployment without SMTP or a push
/// gateway still dispatches, and the unconfigured channel simply reports
/// failure per notification.
pub struct DisabledSender;

#[async_trait::async_trait]
impl EmailSender for DisabledSender {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), SendError> {
        Err(SendError::NotConfigured("email"))
    }
}

#[async_trait::async_trait]
impl PushSender for DisabledSender {
    async fn send(
        &self,
        _user_id: DbId,
        _title: &str,
        _body: &str,
        _data: &serde_json::Value,
    ) -> Result<PushReceipt, SendError> {
        Err(SendError::NotConfigured("push"))
    }
}
