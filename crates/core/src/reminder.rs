//! Reminder kinds, offset schedules, and candidate-instant planning.
//!
//! This module lives in `core` (zero internal deps) so it can be used by the
//! candidate generators, the repositories, and any future CLI tooling. The
//! planning functions are pure: they take the clock as an argument and never
//! touch the database.

use chrono::Duration;

use crate::types::Timestamp;

/// Default reminder offsets, in minutes before the item's due instant,
/// ordered furthest-out first.
pub const DEFAULT_OFFSET_MINUTES: [i64; 2] = [60, 15];

/// Default forward scan window for the generators.
pub const DEFAULT_LOOKAHEAD_HOURS: i64 = 24;

/// Default dispatch horizon: a candidate instant further out than this is
/// left for a later generator run, bounding queue growth.
pub const DEFAULT_DISPATCH_HORIZON_MINUTES: i64 = 60;

// ---------------------------------------------------------------------------
// ReminderKind
// ---------------------------------------------------------------------------

/// The kind of item a queued notification reminds about.
///
/// Stored as TEXT in `queued_notifications.kind` and
/// `notification_history.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    /// A calendar event starting soon.
    EventReminder,
    /// A task due soon.
    TaskReminder,
}

impl ReminderKind {
    /// The TEXT value stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::EventReminder => "event_reminder",
            ReminderKind::TaskReminder => "task_reminder",
        }
    }

    /// Parse the stored TEXT value back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event_reminder" => Some(ReminderKind::EventReminder),
            "task_reminder" => Some(ReminderKind::TaskReminder),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OffsetSchedule
// ---------------------------------------------------------------------------

/// An ordered list of reminder offsets (minutes before the due instant) for
/// one reminder kind.
///
/// Offsets are configuration, not constants: each kind can carry its own
/// list, overridden via `REMINDER_OFFSETS_EVENT` / `REMINDER_OFFSETS_TASK`
/// (comma-separated minutes, furthest-out first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetSchedule {
    offsets: Vec<i64>,
}

impl OffsetSchedule {
    /// Build a schedule from an ordered list of minute offsets.
    ///
    /// Non-positive and duplicate entries are discarded; an empty result
    /// falls back to the defaults so a bad override never silences all
    /// reminders.
    pub fn new(minutes: impl IntoIterator<Item = i64>) -> Self {
        let mut offsets: Vec<i64> = Vec::new();
        for m in minutes {
            if m > 0 && !offsets.contains(&m) {
                offsets.push(m);
            }
        }
        if offsets.is_empty() {
            offsets = DEFAULT_OFFSET_MINUTES.to_vec();
        }
        Self { offsets }
    }

    /// Parse a comma-separated minutes list, e.g. `"60,15"`.
    ///
    /// Returns `None` when no entry parses, so callers can fall back to
    /// [`OffsetSchedule::default`].
    pub fn parse(spec: &str) -> Option<Self> {
        let minutes: Vec<i64> = spec
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect();
        if minutes.iter().any(|m| *m > 0) {
            Some(Self::new(minutes))
        } else {
            None
        }
    }

    /// The ordered minute offsets.
    pub fn minutes(&self) -> &[i64] {
        &self.offsets
    }
}

impl Default for OffsetSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_OFFSET_MINUTES)
    }
}

// ---------------------------------------------------------------------------
// Candidate planning
// ---------------------------------------------------------------------------

/// A reminder instant the generator should enqueue for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedInstant {
    /// Minutes before the due instant this reminder fires.
    pub offset_minutes: i64,
    /// The absolute instant the notification becomes due for dispatch.
    pub scheduled_for: Timestamp,
}

/// Compute which offsets of `schedule` produce an instant inside the
/// enqueue window `(now, now + horizon]` for an item due at `due_at`.
///
/// Instants already in the past are dropped (the 1-hour offset of an event
/// starting in 55 minutes, for example). Instants beyond the horizon are
/// left for a later run so repeated scans of the same future item do not
/// grow the queue.
///
/// Last-chance rule: when the item is still ahead but every instant has
/// already passed (a task due in 10 minutes), the most imminent offset is
/// planned for one second from `now` so the reminder still goes out. The
/// dedup key makes a repeat run a no-op.
pub fn plan_instants(
    schedule: &OffsetSchedule,
    due_at: Timestamp,
    now: Timestamp,
    horizon: Duration,
) -> Vec<PlannedInstant> {
    let window_end = now + horizon;
    let planned: Vec<PlannedInstant> = schedule
        .minutes()
        .iter()
        .filter_map(|&offset_minutes| {
            let scheduled_for = due_at - Duration::minutes(offset_minutes);
            if scheduled_for > now && scheduled_for <= window_end {
                Some(PlannedInstant {
                    offset_minutes,
                    scheduled_for,
                })
            } else {
                None
            }
        })
        .collect();

    if !planned.is_empty() || due_at <= now {
        return planned;
    }

    // All instants passed but the item has not: fire the most imminent
    // offset now (the smallest, i.e. closest to the due instant).
    let last_chance = schedule.minutes().iter().copied().min().filter(|&offset| {
        due_at - Duration::minutes(offset) <= now
    });
    match last_chance {
        Some(offset_minutes) => vec![PlannedInstant {
            offset_minutes,
            scheduled_for: now + Duration::seconds(1),
        }],
        None => Vec::new(),
    }
}
