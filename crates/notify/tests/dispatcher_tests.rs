//! Integration tests for the delivery dispatcher.

mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use sqlx::PgPool;
use tandem_db::repositories::HistoryRepo;
use tandem_notify::Dispatcher;

use common::{
    insert_due_row, insert_user, make_due_now, queue_rows_for_user, test_config,
    RecordingEmailSender, RecordingPushSender,
};

fn dispatcher(
    pool: &PgPool,
    email: Arc<RecordingEmailSender>,
    push: Arc<RecordingPushSender>,
) -> Dispatcher {
    Dispatcher::new(pool.clone(), email, push, test_config())
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn due_email_row_is_sent_and_recorded(pool: PgPool) {
    let user = insert_user(&pool, Some("ana@example.com")).await;
    insert_due_row(&pool, user, 1, &["email"]).await;

    let email = Arc::new(RecordingEmailSender::default());
    let push = Arc::new(RecordingPushSender::delivering(1));
    let report = dispatcher(&pool, Arc::clone(&email), push).run().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(email.sent_count(), 1);
    assert_eq!(
        email.sent.lock().unwrap()[0].0,
        "ana@example.com".to_string()
    );

    let rows = queue_rows_for_user(&pool, user).await;
    assert_eq!(rows[0].status, "sent");
    assert_eq!(rows[0].attempts, 1);
    assert!(rows[0].sent_at.is_some());

    let history = HistoryRepo::list_for_user(&pool, user, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, "sent");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn future_rows_are_never_selected(pool: PgPool) {
    let user = insert_user(&pool, Some("ana@example.com")).await;
    let id = insert_due_row(&pool, user, 1, &["email"]).await;
    sqlx::query(
        "UPDATE queued_notifications SET scheduled_for = NOW() + INTERVAL '30 minutes' \
         WHERE id = $1",
    )
    .bind(id)
    .execute(&pool)
    .await
    .unwrap();

    let email = Arc::new(RecordingEmailSender::default());
    let push = Arc::new(RecordingPushSender::delivering(1));
    let report = dispatcher(&pool, Arc::clone(&email), push).run().await.unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(email.sent_count(), 0);
    assert_eq!(queue_rows_for_user(&pool, user).await[0].status, "pending");
}

// ---------------------------------------------------------------------------
// Scenario: email hangs, push succeeds
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn one_channel_success_settles_the_row_as_sent(pool: PgPool) {
    let user = insert_user(&pool, Some("ana@example.com")).await;
    insert_due_row(&pool, user, 1, &["email", "push"]).await;

    // Email hangs past the 1-second send timeout; push delivers to one device.
    let email = Arc::new(RecordingEmailSender::hanging(StdDuration::from_secs(3)));
    let push = Arc::new(RecordingPushSender::delivering(1));
    let report = dispatcher(&pool, email, Arc::clone(&push)).run().await.unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(push.invoked_count(), 1);

    let rows = queue_rows_for_user(&pool, user).await;
    assert_eq!(rows[0].status, "sent");
    assert_eq!(rows[0].attempts, 1);

    let history = HistoryRepo::list_for_user(&pool, user, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, "sent");
    let attempted: Vec<String> =
        serde_json::from_value(history[0].channels_attempted.clone()).unwrap();
    let succeeded: Vec<String> =
        serde_json::from_value(history[0].channels_succeeded.clone()).unwrap();
    assert_eq!(attempted, vec!["email", "push"]);
    assert_eq!(succeeded, vec!["push"]);
}

// ---------------------------------------------------------------------------
// Scenario: no resolvable contact data
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_email_address_fails_without_invoking_any_sender(pool: PgPool) {
    let user = insert_user(&pool, None).await;
    insert_due_row(&pool, user, 1, &["email"]).await;

    let email = Arc::new(RecordingEmailSender::default());
    let push = Arc::new(RecordingPushSender::delivering(1));
    let report = dispatcher(&pool, Arc::clone(&email), Arc::clone(&push))
        .run()
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(email.sent_count(), 0);
    assert_eq!(push.invoked_count(), 0);

    let rows = queue_rows_for_user(&pool, user).await;
    assert_eq!(rows[0].status, "failed");
    assert_eq!(rows[0].error_message.as_deref(), Some("no contact info"));

    let history = HistoryRepo::list_for_user(&pool, user, 10).await.unwrap();
    assert_eq!(history[0].status, "failed");
}

// ---------------------------------------------------------------------------
// Retry budget
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn all_channel_failure_requeues_until_the_budget_is_spent(pool: PgPool) {
    let user = insert_user(&pool, Some("ana@example.com")).await;
    let id = insert_due_row(&pool, user, 1, &["email", "push"]).await;

    let email = Arc::new(RecordingEmailSender::failing("connection refused"));
    let push = Arc::new(RecordingPushSender::dead("device token expired"));

    // Attempts 1 and 2: requeued with backoff.
    for expected_attempts in 1..=2 {
        let report = dispatcher(&pool, Arc::clone(&email), Arc::clone(&push))
            .run()
            .await
            .unwrap();
        assert_eq!(report.requeued, 1);
        assert_eq!(report.failed, 0);

        let rows = queue_rows_for_user(&pool, user).await;
        assert_eq!(rows[0].status, "pending");
        assert_eq!(rows[0].attempts, expected_attempts);
        assert!(rows[0].scheduled_for > Utc::now());
        let error = rows[0].error_message.clone().unwrap();
        assert!(error.contains("email: connection refused"));
        assert!(error.contains("push: device token expired"));

        make_due_now(&pool, id).await;
    }

    // Attempt 3 exhausts max_attempts: terminal failure with history.
    let report = dispatcher(&pool, Arc::clone(&email), Arc::clone(&push))
        .run()
        .await
        .unwrap();
    assert_eq!(report.failed, 1);

    let rows = queue_rows_for_user(&pool, user).await;
    assert_eq!(rows[0].status, "failed");
    assert_eq!(rows[0].attempts, rows[0].max_attempts);

    let history = HistoryRepo::list_for_user(&pool, user, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, "failed");
    let succeeded: Vec<String> =
        serde_json::from_value(history[0].channels_succeeded.clone()).unwrap();
    assert!(succeeded.is_empty());

    // Exhausted rows are never claimed again.
    make_due_now(&pool, id).await;
    sqlx::query("UPDATE queued_notifications SET status = 'pending' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();
    let report = dispatcher(&pool, email, push).run().await.unwrap();
    assert_eq!(report.processed, 0);
}

// ---------------------------------------------------------------------------
// Claim correctness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn concurrent_runs_produce_exactly_one_send_attempt(pool: PgPool) {
    let user = insert_user(&pool, Some("ana@example.com")).await;
    insert_due_row(&pool, user, 1, &["email"]).await;

    let email = Arc::new(RecordingEmailSender::default());
    let push = Arc::new(RecordingPushSender::delivering(1));
    let d1 = dispatcher(&pool, Arc::clone(&email), Arc::clone(&push));
    let d2 = dispatcher(&pool, Arc::clone(&email), Arc::clone(&push));

    let (r1, r2) = tokio::join!(d1.run(), d2.run());
    let (r1, r2) = (r1.unwrap(), r2.unwrap());

    assert_eq!(r1.processed + r2.processed, 1);
    assert_eq!(r1.sent + r2.sent, 1);
    assert_eq!(email.sent_count(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stale_claims_are_released_and_reprocessed(pool: PgPool) {
    let user = insert_user(&pool, Some("ana@example.com")).await;
    let id = insert_due_row(&pool, user, 1, &["email"]).await;

    // Simulate a run killed mid-batch 20 minutes ago.
    sqlx::query(
        "UPDATE queued_notifications \
         SET status = 'processing', claimed_at = NOW() - INTERVAL '20 minutes' \
         WHERE id = $1",
    )
    .bind(id)
    .execute(&pool)
    .await
    .unwrap();

    let email = Arc::new(RecordingEmailSender::default());
    let push = Arc::new(RecordingPushSender::delivering(1));
    let report = dispatcher(&pool, Arc::clone(&email), push).run().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.sent, 1);
    assert_eq!(email.sent_count(), 1);
    assert_eq!(queue_rows_for_user(&pool, user).await[0].status, "sent");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn fresh_claims_are_not_stolen(pool: PgPool) {
    let user = insert_user(&pool, Some("ana@example.com")).await;
    let id = insert_due_row(&pool, user, 1, &["email"]).await;

    // A claim from moments ago is still leased to its run.
    sqlx::query(
        "UPDATE queued_notifications SET status = 'processing', claimed_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(&pool)
    .await
    .unwrap();

    let email = Arc::new(RecordingEmailSender::default());
    let push = Arc::new(RecordingPushSender::delivering(1));
    let report = dispatcher(&pool, Arc::clone(&email), push).run().await.unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(email.sent_count(), 0);
}
