//! Reminder pipeline tuning, loaded from environment variables.

use chrono::Duration;
use tandem_core::reminder::{
    OffsetSchedule, ReminderKind, DEFAULT_DISPATCH_HORIZON_MINUTES, DEFAULT_LOOKAHEAD_HOURS,
};

/// Default number of rows one dispatcher run claims.
const DEFAULT_BATCH_LIMIT: i64 = 50;

/// Default bound on a single channel send, in seconds.
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

/// Default claim lease: `processing` rows older than this are released.
const DEFAULT_CLAIM_LEASE_MINUTES: i64 = 10;

/// Default linear retry backoff step, in minutes per attempt.
const DEFAULT_RETRY_BACKOFF_MINUTES: i64 = 5;

/// Tuning for the generators and the dispatcher.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Forward scan window for due items.
    pub lookahead: Duration,
    /// Enqueue window: candidate instants beyond `now + dispatch_horizon`
    /// wait for a later generator run.
    pub dispatch_horizon: Duration,
    /// Ordered reminder offsets for calendar events.
    pub event_offsets: OffsetSchedule,
    /// Ordered reminder offsets for tasks.
    pub task_offsets: OffsetSchedule,
    /// Maximum rows claimed per dispatcher run.
    pub batch_limit: i64,
    /// Bound on one channel send attempt, in seconds.
    pub send_timeout_secs: u64,
    /// Claim lease before a stale `processing` row is released, in minutes.
    pub claim_lease_minutes: i64,
    /// Linear backoff step for retry requeues, in minutes per attempt.
    pub retry_backoff_minutes: i64,
}

impl ReminderConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default | Meaning                         |
    /// |---------------------------|---------|---------------------------------|
    /// | `REMINDER_LOOKAHEAD_HOURS`| `24`    | forward scan window             |
    /// | `REMINDER_HORIZON_MINUTES`| `60`    | enqueue horizon                 |
    /// | `REMINDER_OFFSETS_EVENT`  | `60,15` | event offsets, minutes          |
    /// | `REMINDER_OFFSETS_TASK`   | `60,15` | task offsets, minutes           |
    /// | `DISPATCH_BATCH_LIMIT`    | `50`    | rows claimed per run            |
    /// | `SEND_TIMEOUT_SECS`       | `10`    | per-channel send bound          |
    /// | `CLAIM_LEASE_MINUTES`     | `10`    | stale-claim release lease       |
    /// | `RETRY_BACKOFF_MINUTES`   | `5`     | backoff step per failed attempt |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lookahead: env_i64("REMINDER_LOOKAHEAD_HOURS")
                .map(Duration::hours)
                .unwrap_or(defaults.lookahead),
            dispatch_horizon: env_i64("REMINDER_HORIZON_MINUTES")
                .map(Duration::minutes)
                .unwrap_or(defaults.dispatch_horizon),
            event_offsets: env_offsets("REMINDER_OFFSETS_EVENT")
                .unwrap_or(defaults.event_offsets),
            task_offsets: env_offsets("REMINDER_OFFSETS_TASK").unwrap_or(defaults.task_offsets),
            batch_limit: env_i64("DISPATCH_BATCH_LIMIT").unwrap_or(defaults.batch_limit),
            send_timeout_secs: env_i64("SEND_TIMEOUT_SECS")
                .map(|v| v as u64)
                .unwrap_or(defaults.send_timeout_secs),
            claim_lease_minutes: env_i64("CLAIM_LEASE_MINUTES")
                .unwrap_or(defaults.claim_lease_minutes),
            retry_backoff_minutes: env_i64("RETRY_BACKOFF_MINUTES")
                .unwrap_or(defaults.retry_backoff_minutes),
        }
    }

    /// The offset schedule for one reminder kind.
    pub fn offsets_for(&self, kind: ReminderKind) -> &OffsetSchedule {
        match kind {
            ReminderKind::EventReminder => &self.event_offsets,
            ReminderKind::TaskReminder => &self.task_offsets,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lookahead: Duration::hours(DEFAULT_LOOKAHEAD_HOURS),
            dispatch_horizon: Duration::minutes(DEFAULT_DISPATCH_HORIZON_MINUTES),
            event_offsets: OffsetSchedule::default(),
            task_offsets: OffsetSchedule::default(),
            batch_limit: DEFAULT_BATCH_LIMIT,
            send_timeout_secs: DEFAULT_SEND_TIMEOUT_SECS,
            claim_lease_minutes: DEFAULT_CLAIM_LEASE_MINUTES,
            retry_backoff_minutes: DEFAULT_RETRY_BACKOFF_MINUTES,
        }
    }
}

fn env_i64(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_offsets(key: &str) -> Option<OffsetSchedule> {
    std::env::var(key)
        .ok()
        .and_then(|v| OffsetSchedule::parse(&v))
}
