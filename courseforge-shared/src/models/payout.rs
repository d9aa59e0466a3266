/// Payout model and database operations
///
/// A payout records one transfer of aggregated creator earnings. Rows are
/// created by the payout batcher in the same transaction that marks the
/// covered orders `paid_out`, so a batch re-run never covers an order twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Payout state, as reported by the payment provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payout_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    /// Transfer requested, not yet settled
    Processing,

    /// Transfer settled
    Paid,

    /// Transfer failed after being requested
    Failed,
}

/// Payout model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payout {
    /// Unique payout ID
    pub id: Uuid,

    /// Creator receiving the transfer
    pub creator_id: Uuid,

    /// Aggregate amount in cents
    pub amount_cents: i32,

    /// Opaque provider transfer reference
    pub transfer_id: String,

    /// Settlement state
    pub status: PayoutStatus,

    /// When the payout was recorded
    pub created_at: DateTime<Utc>,
}

impl Payout {
    /// Lists payouts for a creator, newest first
    pub async fn list_by_creator(pool: &PgPool, creator_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Payout>(
            r#"
            SELECT id, creator_id, amount_cents, transfer_id, status, created_at
            FROM payouts
            WHERE creator_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(pool)
        .await
    }

    /// Sums all payouts ever recorded for a creator
    pub async fn total_for_creator(pool: &PgPool, creator_id: Uuid) -> Result<i64, sqlx::Error> {
        let (total,): (Option<i64>,) = sqlx::query_as(
            "SELECT SUM(amount_cents)::BIGINT FROM payouts WHERE creator_id = $1",
        )
        .bind(creator_id)
        .fetch_one(pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}
