use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tandem_notify::sender::{
    DisabledSender, EmailSender, HttpPushSender, PushSender, SmtpEmailSender,
};
use tandem_notify::ReminderConfig;
use tandem_worker::{interval_from_env, Scheduler};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tandem_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = tandem_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tandem_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tandem_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let email: Arc<dyn EmailSender> = match SmtpEmailSender::from_env() {
        Some(sender) => Arc::new(sender),
        None => {
            tracing::warn!("SMTP not configured, email channel disabled");
            Arc::new(DisabledSender)
        }
    };
    let push: Arc<dyn PushSender> = match HttpPushSender::from_env(pool.clone()) {
        Some(sender) => Arc::new(sender),
        None => {
            tracing::warn!("Push gateway not configured, push channel disabled");
            Arc::new(DisabledSender)
        }
    };

    let interval = interval_from_env();
    tracing::info!(interval_secs = interval.as_secs(), "Worker starting");

    let scheduler = Scheduler::new(pool, email, push, ReminderConfig::from_env(), interval);

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT (Ctrl-C), stopping scheduler");
            cancel_on_signal.cancel();
        }
    });

    scheduler.run(cancel).await;
    tracing::info!("Worker stopped");
}
