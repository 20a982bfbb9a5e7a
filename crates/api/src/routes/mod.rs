pub mod health;
pub mod reminders;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /reminders/generate-event-reminders    scan events, enqueue (POST)
/// /reminders/generate-task-reminders     scan tasks, enqueue (POST)
/// /reminders/dispatch-notifications      deliver due notifications (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/reminders", reminders::router())
}
