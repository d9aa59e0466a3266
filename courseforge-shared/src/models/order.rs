/// Order model and database operations
///
/// Orders are the purchase ledger. Each row records the gross charge and its
/// fee split, plus the opaque payment-provider references needed for refund
/// correlation and audit. `payment_session_id` is UNIQUE so a re-delivered
/// checkout-completion webhook cannot create a duplicate ledger entry, and
/// `paid_out` is the payout watermark guaranteeing at-most-once payout per
/// order.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE order_status AS ENUM ('completed', 'refunded');
///
/// CREATE TABLE orders (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
///     payment_session_id VARCHAR(255) NOT NULL UNIQUE,
///     payment_intent_id VARCHAR(255),
///     amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
///     platform_fee_cents INTEGER NOT NULL CHECK (platform_fee_cents >= 0),
///     creator_payout_cents INTEGER NOT NULL CHECK (creator_payout_cents >= 0),
///     status order_status NOT NULL DEFAULT 'completed',
///     paid_out BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK (platform_fee_cents + creator_payout_cents = amount_cents)
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Order state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Payment captured, enrollment granted
    Completed,

    /// Refunded by an admin; enrollment revoked
    Refunded,
}

impl OrderStatus {
    /// Converts status to string for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "completed",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Order model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID
    pub id: Uuid,

    /// Purchasing user
    pub user_id: Uuid,

    /// Purchased course
    pub course_id: Uuid,

    /// Opaque provider checkout session id (idempotency key)
    pub payment_session_id: String,

    /// Opaque provider payment reference (used for refunds)
    pub payment_intent_id: Option<String>,

    /// Gross charge in cents
    pub amount_cents: i32,

    /// Platform share in cents
    pub platform_fee_cents: i32,

    /// Creator share in cents
    pub creator_payout_cents: i32,

    /// Order state
    pub status: OrderStatus,

    /// True once the creator share has been included in a payout
    pub paid_out: bool,

    /// When the order was created
    pub created_at: DateTime<Utc>,

    /// When the order was last updated
    pub updated_at: DateTime<Utc>,
}

/// A completed order joined with its creator's payout account, as consumed
/// by the payout batcher
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PayableOrder {
    /// Order ID (marked `paid_out` once transferred)
    pub id: Uuid,

    /// Creator who earns the payout
    pub creator_id: Uuid,

    /// Creator's payment-provider payee account
    pub payout_account_id: Option<String>,

    /// Creator share in cents
    pub creator_payout_cents: i32,
}

impl Order {
    /// Finds an order by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, course_id, payment_session_id, payment_intent_id,
                   amount_cents, platform_fee_cents, creator_payout_cents,
                   status, paid_out, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds an order by its provider checkout session id
    ///
    /// Used to detect re-delivered checkout-completion webhooks.
    pub async fn find_by_session(
        pool: &PgPool,
        payment_session_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, course_id, payment_session_id, payment_intent_id,
                   amount_cents, platform_fee_cents, creator_payout_cents,
                   status, paid_out, created_at, updated_at
            FROM orders
            WHERE payment_session_id = $1
            "#,
        )
        .bind(payment_session_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists orders for a user, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, course_id, payment_session_id, payment_intent_id,
                   amount_cents, platform_fee_cents, creator_payout_cents,
                   status, paid_out, created_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Lists completed orders eligible for payout within the trailing window
    ///
    /// Only orders that have not yet been paid out are returned; the creator's
    /// payout account is joined in so the batcher can skip creators who have
    /// not finished payee onboarding.
    pub async fn list_payable(
        pool: &PgPool,
        window: Duration,
    ) -> Result<Vec<PayableOrder>, sqlx::Error> {
        let cutoff = Utc::now() - window;

        sqlx::query_as::<_, PayableOrder>(
            r#"
            SELECT o.id, c.creator_id, u.payout_account_id, o.creator_payout_cents
            FROM orders o
            JOIN courses c ON c.id = o.course_id
            JOIN users u ON u.id = c.creator_id
            WHERE o.status = 'completed'
              AND o.paid_out = FALSE
              AND o.created_at >= $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(OrderStatus::Refunded.as_str(), "refunded");
    }
}
