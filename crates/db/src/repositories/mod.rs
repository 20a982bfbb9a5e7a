//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod calendar_event_repo;
pub mod history_repo;
pub mod pair_repo;
pub mod preference_repo;
pub mod push_subscription_repo;
pub mod queue_repo;
pub mod task_repo;
pub mod user_repo;

pub use calendar_event_repo::CalendarEventRepo;
pub use history_repo::HistoryRepo;
pub use pair_repo::PairRepo;
pub use preference_repo::PreferenceRepo;
pub use push_subscription_repo::PushSubscriptionRepo;
pub use queue_repo::QueueRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
