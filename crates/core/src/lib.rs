//! Tandem domain logic shared by the database, notification, API, and worker
//! crates.
//!
//! This crate has zero internal dependencies so every other workspace member
//! can use it. It contains:
//!
//! - [`types`] — ID and timestamp aliases used across the schema.
//! - [`error`] — the [`CoreError`](error::CoreError) domain error type.
//! - [`channels`] — well-known delivery channel name constants.
//! - [`reminder`] — reminder kinds, offset schedules, and candidate-instant
//!   planning.
//! - [`queue`] — the queued-notification status state machine.
//! - [`quiet_hours`] — per-user quiet-hours window evaluation.

pub mod channels;
pub mod error;
pub mod queue;
pub mod quiet_hours;
pub mod reminder;
pub mod types;
