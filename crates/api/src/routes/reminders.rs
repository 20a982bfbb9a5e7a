//! Batch reminder pipeline endpoints.
//!
//! Each endpoint runs one batch pass synchronously and reports counts, so an
//! external cron (or the worker binary) can drive the pipeline and observe
//! what each pass did. All three are idempotent at the pipeline level: the
//! queue dedup key absorbs generator re-runs, and the atomic claim partitions
//! concurrent dispatch runs.

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::post, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tandem_notify::{Dispatcher, ReminderGenerator};

use crate::error::AppResult;
use crate::state::AppState;

/// Response for the event reminder generation pass.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGenerationResponse {
    pub success: bool,
    pub processed_events: u64,
    pub queued_notifications: u64,
}

/// Response for the task reminder generation pass.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGenerationResponse {
    pub success: bool,
    pub tasks_processed: u64,
    pub reminders_queued: u64,
}

/// Response for the dispatch pass.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub success: bool,
    pub processed_notifications: u64,
    pub sent_count: u64,
    pub failed_count: u64,
}

/// POST /api/v1/reminders/generate-event-reminders -- scan upcoming calendar
/// events and enqueue reminder notifications.
async fn generate_event_reminders(
    State(state): State<AppState>,
) -> AppResult<Json<EventGenerationResponse>> {
    let generator = ReminderGenerator::new(state.pool.clone(), state.reminders.clone());
    let report = generator.run_events(Utc::now()).await?;

    Ok(Json(EventGenerationResponse {
        success: true,
        processed_events: report.processed,
        queued_notifications: report.queued,
    }))
}

/// POST /api/v1/reminders/generate-task-reminders -- scan upcoming tasks and
/// enqueue reminder notifications.
async fn generate_task_reminders(
    State(state): State<AppState>,
) -> AppResult<Json<TaskGenerationResponse>> {
    let generator = ReminderGenerator::new(state.pool.clone(), state.reminders.clone());
    let report = generator.run_tasks(Utc::now()).await?;

    Ok(Json(TaskGenerationResponse {
        success: true,
        tasks_processed: report.processed,
        reminders_queued: report.queued,
    }))
}

/// POST /api/v1/reminders/dispatch-notifications -- claim due notifications
/// and attempt delivery over their requested channels.
async fn dispatch_notifications(
    State(state): State<AppState>,
) -> AppResult<Json<DispatchResponse>> {
    let dispatcher = Dispatcher::new(
        state.pool.clone(),
        Arc::clone(&state.email),
        Arc::clone(&state.push),
        state.reminders.clone(),
    );
    let report = dispatcher.run().await?;

    Ok(Json(DispatchResponse {
        success: true,
        processed_notifications: report.processed,
        sent_count: report.sent,
        failed_count: report.failed,
    }))
}

/// Mount the reminder pipeline routes (intended under `/api/v1/reminders`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-event-reminders", post(generate_event_reminders))
        .route("/generate-task-reminders", post(generate_task_reminders))
        .route("/dispatch-notifications", post(dispatch_notifications))
}
