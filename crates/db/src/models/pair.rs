//! Pair entity model (read-only to this subsystem).

use serde::Serialize;
use sqlx::FromRow;
use tandem_core::types::{DbId, Timestamp};

/// A row from the `pairs` table. Membership lives in `pair_members`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pair {
    pub id: DbId,
    pub created_at: Timestamp,
}
