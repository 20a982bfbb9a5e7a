//! Push device subscription entity model.

use serde::Serialize;
use sqlx::FromRow;
use tandem_core::types::{DbId, Timestamp};

/// A row from the `push_subscriptions` table. One row per registered device;
/// a user may have several, and a push counts as delivered when at least one
/// device accepted it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PushSubscription {
    pub id: DbId,
    pub user_id: DbId,
    /// Gateway endpoint URL for this device.
    pub endpoint: String,
    /// Opaque per-device auth material forwarded to the gateway.
    pub auth: Option<serde_json::Value>,
    pub revoked: bool,
    pub created_at: Timestamp,
}
