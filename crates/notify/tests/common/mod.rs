//! Shared fixtures and sender doubles for the pipeline integration tests.
#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tandem_core::types::{DbId, Timestamp};
use tandem_db::models::queue::{NewQueuedNotification, QueuedNotification};
use tandem_db::repositories::QueueRepo;
use tandem_notify::sender::{EmailSender, PushReceipt, PushSender, SendError};
use tandem_notify::ReminderConfig;

// ---------------------------------------------------------------------------
// Sender doubles
// ---------------------------------------------------------------------------

/// Email double that records deliveries and can be scripted to fail or hang.
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_with: Option<String>,
    pub delay: Option<StdDuration>,
}

impl RecordingEmailSender {
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn hanging(delay: StdDuration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), SendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.fail_with {
            return Err(SendError::Other(reason.clone()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

/// Push double that records invocations and returns a scripted receipt.
pub struct RecordingPushSender {
    pub invoked: Mutex<Vec<DbId>>,
    pub delivered: usize,
    pub errors: Vec<String>,
}

impl RecordingPushSender {
    pub fn delivering(devices: usize) -> Self {
        Self {
            invoked: Mutex::new(Vec::new()),
            delivered: devices,
            errors: Vec::new(),
        }
    }

    pub fn dead(reason: &str) -> Self {
        Self {
            invoked: Mutex::new(Vec::new()),
            delivered: 0,
            errors: vec![reason.to_string()],
        }
    }

    pub fn invoked_count(&self) -> usize {
        self.invoked.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl PushSender for RecordingPushSender {
    async fn send(
        &self,
        user_id: DbId,
        _title: &str,
        _body: &str,
        _data: &serde_json::Value,
    ) -> Result<PushReceipt, SendError> {
        self.invoked.lock().unwrap().push(user_id);
        Ok(PushReceipt {
            delivered: self.delivered,
            errors: self.errors.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Default tuning with a short send timeout so hang tests stay fast.
pub fn test_config() -> ReminderConfig {
    ReminderConfig {
        send_timeout_secs: 1,
        ..ReminderConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Row fixtures
// ---------------------------------------------------------------------------

pub async fn insert_user(pool: &PgPool, email: Option<&str>) -> DbId {
    sqlx::query_scalar("INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id")
        .bind(email)
        .bind("Test User")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn insert_pair(pool: &PgPool, members: &[DbId]) -> DbId {
    let pair_id: DbId = sqlx::query_scalar("INSERT INTO pairs DEFAULT VALUES RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap();
    for user_id in members {
        sqlx::query("INSERT INTO pair_members (pair_id, user_id) VALUES ($1, $2)")
            .bind(pair_id)
            .bind(user_id)
            .execute(pool)
            .await
            .unwrap();
    }
    pair_id
}

pub async fn insert_event(
    pool: &PgPool,
    pair_id: DbId,
    title: &str,
    starts_at: Timestamp,
    assignee: Option<DbId>,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO calendar_events (pair_id, title, starts_at, assignee) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(pair_id)
    .bind(title)
    .bind(starts_at)
    .bind(assignee)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_task(
    pool: &PgPool,
    pair_id: DbId,
    title: &str,
    due_at: Timestamp,
    assignee: Option<DbId>,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO tasks (pair_id, title, due_at, assignee) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(pair_id)
    .bind(title)
    .bind(due_at)
    .bind(assignee)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn set_preference(
    pool: &PgPool,
    user_id: DbId,
    event_reminders: bool,
    task_reminders: bool,
    email_enabled: bool,
    push_enabled: bool,
) {
    sqlx::query(
        "INSERT INTO notification_preferences \
            (user_id, event_reminders, task_reminders, email_enabled, push_enabled) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(event_reminders)
    .bind(task_reminders)
    .bind(email_enabled)
    .bind(push_enabled)
    .execute(pool)
    .await
    .unwrap();
}

/// Insert a queue row that is already due for dispatch.
pub async fn insert_due_row(
    pool: &PgPool,
    user_id: DbId,
    source_id: DbId,
    channels: &[&str],
) -> DbId {
    let new = NewQueuedNotification {
        user_id,
        kind: "task_reminder".to_string(),
        title: "Reminder: water the plants".to_string(),
        message: "\"water the plants\" is due in 15 minutes.".to_string(),
        channels: channels.iter().map(|c| c.to_string()).collect(),
        scheduled_for: Utc::now() - Duration::minutes(1),
        pair_id: None,
        source_id,
        offset_minutes: 15,
        data: serde_json::json!({ "source_id": source_id, "offset_minutes": 15 }),
    };
    QueueRepo::insert_if_absent(pool, &new)
        .await
        .unwrap()
        .expect("fixture row should insert")
}

pub async fn queue_rows_for_user(pool: &PgPool, user_id: DbId) -> Vec<QueuedNotification> {
    sqlx::query_as(
        "SELECT id, user_id, kind, title, message, channels, scheduled_for, status, \
                attempts, max_attempts, pair_id, source_id, offset_minutes, data, \
                error_message, sent_at, claimed_at, created_at \
         FROM queued_notifications WHERE user_id = $1 ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

/// Force a pending row due immediately (collapses retry backoff in tests).
pub async fn make_due_now(pool: &PgPool, id: DbId) {
    sqlx::query(
        "UPDATE queued_notifications SET scheduled_for = NOW() - INTERVAL '1 second' \
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await
    .unwrap();
}
