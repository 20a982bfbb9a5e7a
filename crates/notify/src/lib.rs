//! Tandem reminder scheduling and multi-channel notification delivery.
//!
//! This crate is the pipeline between domain items (calendar events, tasks)
//! and the user's inbox or devices:
//!
//! - [`ReminderGenerator`] — scans items due within a lookahead window,
//!   resolves recipients and preferences, and idempotently enqueues
//!   notifications.
//! - [`Dispatcher`] — claims due queue rows, fans out to the channel
//!   senders, and records terminal outcomes in the history table.
//! - [`sender`] — the [`EmailSender`](sender::EmailSender) and
//!   [`PushSender`](sender::PushSender) seams plus the SMTP and push-gateway
//!   production implementations.
//! - [`ReminderConfig`] — lookahead, horizon, offset schedules, batch and
//!   retry tuning, loaded from the environment.
//!
//! Every entry point is a short-lived, stateless batch: callers (the HTTP
//! API, the interval worker, or anything else) decide when to invoke it.
//! Overlapping invocations are tolerated; correctness rests on the atomic
//! row claim in `tandem_db::repositories::QueueRepo`.

pub mod config;
pub mod dispatcher;
pub mod generator;
pub mod sender;

pub use config::ReminderConfig;
pub use dispatcher::{DispatchReport, Dispatcher};
pub use generator::{GeneratorReport, ReminderGenerator};
