//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus insert DTOs where this subsystem creates rows.

pub mod calendar_event;
pub mod history;
pub mod pair;
pub mod preference;
pub mod push_subscription;
pub mod queue;
pub mod task;
pub mod user;
