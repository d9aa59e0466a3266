//! # Courseforge Worker
//!
//! The background worker for the Courseforge marketplace. Its single job is
//! creator payouts: on a fixed interval it aggregates completed, unpaid
//! orders per creator over a trailing window and issues one payment-provider
//! transfer per creator above the minimum threshold.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p courseforge-worker
//! ```
//!
//! ## Environment
//!
//! - `DATABASE_URL` (required)
//! - `PAYMENT_SECRET_KEY` / `PAYMENT_API_BASE` - provider credentials; when
//!   missing every batch run logs transfer failures instead of paying out
//! - `PAYOUT_INTERVAL_SECS` - seconds between runs (default 86400)

use courseforge_shared::db::pool::{create_pool, DatabaseConfig};
use courseforge_shared::payouts::PayoutPolicy;
use courseforge_shared::providers::payment::{PaymentClient, PaymentConfig};
use courseforge_worker::scheduler::{PayoutScheduler, SchedulerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courseforge_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Courseforge Worker v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let pool = create_pool(DatabaseConfig {
        url: database_url,
        ..Default::default()
    })
    .await?;

    courseforge_shared::db::migrations::run_migrations(&pool).await?;

    let payments = PaymentClient::from_config(&PaymentConfig {
        secret_key: std::env::var("PAYMENT_SECRET_KEY").ok(),
        api_base: std::env::var("PAYMENT_API_BASE")
            .unwrap_or_else(|_| "https://api.payments.example.com".to_string()),
    });

    if !payments.is_configured() {
        tracing::warn!("Payment provider credentials missing; batch runs will not transfer funds");
    }

    let run_interval_secs = std::env::var("PAYOUT_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(24 * 60 * 60);

    let scheduler = PayoutScheduler::with_config(
        pool,
        payments,
        SchedulerConfig {
            run_interval_secs,
            policy: PayoutPolicy::default(),
        },
    );

    let shutdown = scheduler.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        shutdown.cancel();
    });

    scheduler.run().await;

    tracing::info!("Worker stopped");
    Ok(())
}
