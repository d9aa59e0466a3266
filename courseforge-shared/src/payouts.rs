/// Creator payout batching
///
/// Aggregates completed, not-yet-paid-out orders per creator over a trailing
/// window and issues one provider transfer per creator above the minimum
/// threshold. Each transfer is recorded as a `processing` payout row in the
/// same transaction that marks the covered orders `paid_out`, so re-running
/// the batch over the same window never pays an order twice.
///
/// One creator's transfer failing is logged and skipped; it never aborts the
/// rest of the batch.
///
/// The batch is reachable from two live paths (the worker's interval
/// scheduler and the operator-triggered HTTP endpoint), so each run takes a
/// session advisory lock before reading the payable set. A run that finds
/// the lock held returns an empty summary without touching anything.

use crate::models::order::{Order, PayableOrder};
use crate::providers::payment::PaymentClient;
use chrono::Duration;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Advisory lock key serializing payout runs across all processes
///
/// Held for the duration of one batch via `pg_try_advisory_xact_lock`; the
/// transaction scope means a crashed or cancelled run releases it
/// automatically.
pub const PAYOUT_BATCH_LOCK_KEY: i64 = 7_413_001;

/// Batch policy knobs, constructed from configuration
#[derive(Debug, Clone)]
pub struct PayoutPolicy {
    /// Trailing window of orders to consider
    pub window: Duration,

    /// Minimum aggregate (cents) worth transferring
    pub min_transfer_cents: i64,
}

impl Default for PayoutPolicy {
    fn default() -> Self {
        Self {
            window: Duration::days(7),
            min_transfer_cents: crate::fees::MIN_TRANSFER_CENTS,
        }
    }
}

/// Per-creator aggregate produced by [`aggregate_by_creator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorAggregate {
    /// Creator's payee account, if onboarding is complete
    pub payout_account_id: Option<String>,

    /// Sum of creator shares in cents
    pub amount_cents: i64,

    /// Orders covered by this aggregate
    pub order_ids: Vec<Uuid>,
}

/// Summary of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayoutRunSummary {
    /// Orders considered in the window
    pub orders_considered: usize,

    /// Transfers successfully issued and recorded
    pub payouts_created: usize,

    /// Creators skipped (no payee account or below threshold)
    pub creators_skipped: usize,

    /// Creators whose transfer failed
    pub transfer_failures: usize,
}

/// Groups payable orders by creator, summing creator shares
///
/// Pure so the grouping logic is testable without a database. BTreeMap keeps
/// iteration order deterministic.
pub fn aggregate_by_creator(orders: &[PayableOrder]) -> BTreeMap<Uuid, CreatorAggregate> {
    let mut aggregates: BTreeMap<Uuid, CreatorAggregate> = BTreeMap::new();

    for order in orders {
        let entry = aggregates
            .entry(order.creator_id)
            .or_insert_with(|| CreatorAggregate {
                payout_account_id: order.payout_account_id.clone(),
                amount_cents: 0,
                order_ids: Vec::new(),
            });

        entry.amount_cents += i64::from(order.creator_payout_cents);
        entry.order_ids.push(order.id);
    }

    aggregates
}

/// Runs one payout batch
///
/// # Errors
///
/// Returns an error only for failures that invalidate the whole run (reading
/// the payable set). Per-creator transfer failures are counted in the
/// summary, not propagated. A run that loses the advisory lock to a
/// concurrent batch returns an empty summary.
pub async fn run_payout_batch(
    pool: &PgPool,
    payments: &PaymentClient,
    policy: &PayoutPolicy,
) -> Result<PayoutRunSummary, sqlx::Error> {
    // Two overlapping runs would both read the same unpaid orders and both
    // transfer them: the watermark is only written after the provider call.
    // A transaction-scoped advisory lock serializes runs; it releases on
    // commit and on rollback alike, including the drop path of any early
    // return below.
    let mut lock_tx = pool.begin().await?;
    let (locked,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_xact_lock($1)")
        .bind(PAYOUT_BATCH_LOCK_KEY)
        .fetch_one(&mut *lock_tx)
        .await?;

    if !locked {
        warn!("Another payout batch is in progress, skipping this run");
        return Ok(PayoutRunSummary::default());
    }

    let payable = Order::list_payable(pool, policy.window).await?;
    let aggregates = aggregate_by_creator(&payable);

    let mut summary = PayoutRunSummary {
        orders_considered: payable.len(),
        ..Default::default()
    };

    info!(
        orders = payable.len(),
        creators = aggregates.len(),
        "Starting payout batch"
    );

    for (creator_id, aggregate) in aggregates {
        let Some(account_id) = aggregate.payout_account_id.as_deref() else {
            warn!(creator_id = %creator_id, "Creator has no payout account, skipping");
            summary.creators_skipped += 1;
            continue;
        };

        if aggregate.amount_cents < policy.min_transfer_cents {
            summary.creators_skipped += 1;
            continue;
        }

        // Transfer first; the payout row and watermark are only written once
        // the provider has accepted the transfer.
        let transfer = match payments.create_transfer(account_id, aggregate.amount_cents).await {
            Ok(transfer) => transfer,
            Err(e) => {
                error!(
                    creator_id = %creator_id,
                    amount_cents = aggregate.amount_cents,
                    error = %e,
                    "Transfer failed, skipping creator"
                );
                summary.transfer_failures += 1;
                continue;
            }
        };

        if let Err(e) =
            record_payout(pool, creator_id, &aggregate, &transfer.id).await
        {
            // The transfer went out but the watermark write failed; surface
            // loudly so the run can be reconciled against the provider ledger.
            error!(
                creator_id = %creator_id,
                transfer_id = %transfer.id,
                error = %e,
                "Transfer issued but payout recording failed, needs reconciliation"
            );
            summary.transfer_failures += 1;
            continue;
        }

        info!(
            creator_id = %creator_id,
            amount_cents = aggregate.amount_cents,
            orders = aggregate.order_ids.len(),
            transfer_id = %transfer.id,
            "Payout recorded"
        );
        summary.payouts_created += 1;
    }

    info!(
        payouts = summary.payouts_created,
        skipped = summary.creators_skipped,
        failures = summary.transfer_failures,
        "Payout batch finished"
    );

    // Releases the advisory lock.
    lock_tx.commit().await?;

    Ok(summary)
}

/// Records a payout row and marks the covered orders paid, atomically
async fn record_payout(
    pool: &PgPool,
    creator_id: Uuid,
    aggregate: &CreatorAggregate,
    transfer_id: &str,
) -> Result<(), sqlx::Error> {
    let amount: i32 = aggregate
        .amount_cents
        .try_into()
        .map_err(|_| sqlx::Error::Protocol("payout amount exceeds i32 range".into()))?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO payouts (creator_id, amount_cents, transfer_id, status)
        VALUES ($1, $2, $3, 'processing')
        "#,
    )
    .bind(creator_id)
    .bind(amount)
    .bind(transfer_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE orders SET paid_out = TRUE, updated_at = NOW() WHERE id = ANY($1)")
        .bind(&aggregate.order_ids)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payable(creator: Uuid, account: Option<&str>, cents: i32) -> PayableOrder {
        PayableOrder {
            id: Uuid::new_v4(),
            creator_id: creator,
            payout_account_id: account.map(str::to_string),
            creator_payout_cents: cents,
        }
    }

    #[test]
    fn test_aggregate_sums_per_creator() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let orders = vec![
            payable(alice, Some("acct_a"), 8_500),
            payable(alice, Some("acct_a"), 4_250),
            payable(bob, Some("acct_b"), 1_700),
        ];

        let aggregates = aggregate_by_creator(&orders);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[&alice].amount_cents, 12_750);
        assert_eq!(aggregates[&alice].order_ids.len(), 2);
        assert_eq!(aggregates[&bob].amount_cents, 1_700);
    }

    #[test]
    fn test_aggregate_empty_input() {
        assert!(aggregate_by_creator(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_keeps_missing_account() {
        let creator = Uuid::new_v4();
        let aggregates = aggregate_by_creator(&[payable(creator, None, 500)]);

        // The batch loop decides to skip, not the aggregation
        assert_eq!(aggregates[&creator].payout_account_id, None);
        assert_eq!(aggregates[&creator].amount_cents, 500);
    }

    #[test]
    fn test_default_policy() {
        let policy = PayoutPolicy::default();
        assert_eq!(policy.window, Duration::days(7));
        assert_eq!(policy.min_transfer_cents, 100);
    }
}
