/// Payout scheduler
///
/// This module implements the worker's loop: on a fixed interval it runs
/// one payout batch against the database, issuing provider transfers for
/// creators with unpaid completed orders. The loop is cancellation-aware
/// so a shutdown signal stops it between runs, never mid-batch.
///
/// # Architecture
///
/// ```text
/// PayoutScheduler
///   ├─> interval tick
///   ├─> run_payout_batch (shared crate)
///   │     ├─> aggregate payable orders per creator
///   │     ├─> PaymentClient: one transfer per creator
///   │     └─> record payout + mark orders paid (one transaction)
///   └─> log the run summary
/// ```
///
/// Failures of a single run are logged and do not stop the scheduler; the
/// payout watermark on orders makes the next run pick up whatever the
/// failed run left behind.

use courseforge_shared::payouts::{run_payout_batch, PayoutPolicy};
use courseforge_shared::providers::payment::PaymentClient;
use sqlx::PgPool;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Payout scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between batch runs
    pub run_interval_secs: u64,

    /// Batch policy (window, minimum transfer)
    pub policy: PayoutPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            // Daily; the trailing window overlaps runs, the paid_out
            // watermark keeps overlapping runs from double-paying
            run_interval_secs: 24 * 60 * 60,
            policy: PayoutPolicy::default(),
        }
    }
}

/// Payout scheduler
pub struct PayoutScheduler {
    db: PgPool,
    payments: PaymentClient,
    config: SchedulerConfig,
    shutdown_token: CancellationToken,
}

impl PayoutScheduler {
    /// Creates a scheduler with the default configuration
    pub fn new(db: PgPool, payments: PaymentClient) -> Self {
        Self::with_config(db, payments, SchedulerConfig::default())
    }

    /// Creates a scheduler with custom configuration
    pub fn with_config(db: PgPool, payments: PaymentClient, config: SchedulerConfig) -> Self {
        PayoutScheduler {
            db,
            payments,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Token that stops the loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs the scheduler until the shutdown token is cancelled
    ///
    /// The first batch runs one full interval after startup, so a crash
    /// loop cannot hammer the payment provider.
    pub async fn run(&self) {
        let mut ticker = interval(Duration::from_secs(self.config.run_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // interval fires immediately; consume the first tick to delay the
        // initial run
        ticker.tick().await;

        info!(
            interval_secs = self.config.run_interval_secs,
            window_days = self.config.policy.window.num_days(),
            min_transfer_cents = self.config.policy.min_transfer_cents,
            "Payout scheduler started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    info!("Payout scheduler shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    /// Runs one payout batch, logging rather than propagating failures
    pub async fn run_once(&self) {
        match run_payout_batch(&self.db, &self.payments, &self.config.policy).await {
            Ok(summary) => {
                info!(
                    orders_considered = summary.orders_considered,
                    payouts_created = summary.payouts_created,
                    creators_skipped = summary.creators_skipped,
                    transfer_failures = summary.transfer_failures,
                    "Payout batch run complete"
                );
            }
            Err(e) => {
                error!(error = %e, "Payout batch run failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.run_interval_secs, 86_400);
        assert_eq!(config.policy.window.num_days(), 7);
    }

    #[tokio::test]
    async fn test_shutdown_token_stops_loop() {
        // An unconfigured client never reaches the provider; the loop must
        // still exit promptly on cancellation.
        let pool = PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
        let scheduler = PayoutScheduler::with_config(
            pool,
            PaymentClient::Unconfigured,
            SchedulerConfig {
                run_interval_secs: 3_600,
                policy: PayoutPolicy::default(),
            },
        );

        let token = scheduler.shutdown_token();
        token.cancel();

        // Returns immediately because the token is already cancelled
        scheduler.run().await;
    }
}
