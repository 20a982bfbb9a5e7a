//! Notification preference entity model.

use serde::Serialize;
use sqlx::FromRow;
use tandem_core::channels::{CHANNEL_EMAIL, CHANNEL_PUSH};
use tandem_core::reminder::ReminderKind;
use tandem_core::types::{DbId, Timestamp};

/// A row from the `notification_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub id: DbId,
    pub user_id: DbId,
    pub event_reminders: bool,
    pub task_reminders: bool,
    pub email_enabled: bool,
    pub push_enabled: bool,
    /// Local `"HH:MM"` quiet-hours bounds; both must be set for a window.
    pub quiet_hours_start: Option<String>,
    pub quiet_hours_end: Option<String>,
    /// IANA timezone name the quiet hours are evaluated in.
    pub timezone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NotificationPreference {
    /// The all-defaults preference used when a user has no stored row:
    /// both categories and both channels enabled, no quiet hours.
    pub fn defaults_for(user_id: DbId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: 0,
            user_id,
            event_reminders: true,
            task_reminders: true,
            email_enabled: true,
            push_enabled: true,
            quiet_hours_start: None,
            quiet_hours_end: None,
            timezone: "UTC".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the reminder category for `kind` is enabled.
    pub fn category_enabled(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::EventReminder => self.event_reminders,
            ReminderKind::TaskReminder => self.task_reminders,
        }
    }

    /// The channel names this user has enabled, in dispatch order.
    pub fn enabled_channels(&self) -> Vec<String> {
        let mut channels = Vec::new();
        if self.email_enabled {
            channels.push(CHANNEL_EMAIL.to_string());
        }
        if self.push_enabled {
            channels.push(CHANNEL_PUSH.to_string());
        }
        channels
    }
}
