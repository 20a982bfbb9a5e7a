//! Well-known delivery channel name constants.
//!
//! These must match the channel values stored in the
//! `queued_notifications.channels` JSONB array and referenced by the
//! generators, the dispatcher, and the history table.

/// Email notification delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";

/// Push notification delivered to the user's registered devices.
pub const CHANNEL_PUSH: &str = "push";
