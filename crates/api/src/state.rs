use std::sync::Arc;

use tandem_notify::sender::{EmailSender, PushSender};
use tandem_notify::ReminderConfig;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tandem_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Reminder pipeline tuning shared by the generator and dispatcher.
    pub reminders: ReminderConfig,
    /// Email channel sender ([`tandem_notify::sender::DisabledSender`] when
    /// SMTP is not configured).
    pub email: Arc<dyn EmailSender>,
    /// Push channel sender.
    pub push: Arc<dyn PushSender>,
}
