/// Checkout fulfillment and refunds
///
/// This module owns the two money-flow transitions on individual orders:
///
/// - **Fulfillment**: a verified "payment completed" notification becomes a
///   completed order plus an enrollment, exactly once per checkout session.
/// - **Refund**: an admin reverses a completed order; the provider refund is
///   issued first, then the order flips to refunded and its enrollments are
///   deleted in one transaction.
///
/// # Idempotency
///
/// Payment-provider webhooks are delivered at least once. Fulfillment checks
/// for an existing order with the same session id before writing anything,
/// and the UNIQUE constraint on `payment_session_id` backs that check under
/// concurrency. Order and enrollment are inserted in a single transaction so
/// an order can never be committed without its enrollment having been
/// attempted; if the (user, course) pair is already enrolled the enrollment
/// insert is a no-op and the order is still recorded for the ledger.

use crate::fees::FeeSchedule;
use crate::models::course::Course;
use crate::models::order::{Order, OrderStatus};
use crate::providers::payment::{PaymentClient, ProviderError};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

/// Error type for fulfillment and refund operations
#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    /// Referenced course does not exist
    #[error("Course {0} not found")]
    CourseNotFound(Uuid),

    /// Referenced order does not exist
    #[error("Order {0} not found")]
    OrderNotFound(Uuid),

    /// Order is already refunded
    #[error("Order {0} is already refunded")]
    AlreadyRefunded(Uuid),

    /// Charge amount outside the representable range
    #[error("Invalid charge amount: {0} cents")]
    InvalidAmount(i64),

    /// Payment provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A verified "payment completed" notification
#[derive(Debug, Clone)]
pub struct PaidCheckout {
    /// Purchasing user
    pub user_id: Uuid,

    /// Purchased course
    pub course_id: Uuid,

    /// Gross charge in cents, as reported by the provider
    pub amount_cents: i64,

    /// Opaque provider payment reference
    pub payment_intent_id: Option<String>,

    /// Opaque provider checkout session id
    pub session_id: String,
}

/// Result of fulfilling a checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// Order and enrollment created
    Fulfilled {
        order_id: Uuid,
        /// False when the (user, course) pair was already enrolled; the
        /// order is still recorded for the ledger
        enrollment_created: bool,
    },

    /// A prior delivery of the same session was already processed
    AlreadyProcessed { order_id: Uuid },
}

/// Records a completed order and grants course access, exactly once per
/// checkout session
///
/// # Errors
///
/// Returns `CourseNotFound` if the course no longer exists, and database
/// errors otherwise. Duplicate deliveries are not errors — they yield
/// [`FulfillmentOutcome::AlreadyProcessed`].
pub async fn fulfill_checkout(
    pool: &PgPool,
    fees: &FeeSchedule,
    checkout: PaidCheckout,
) -> Result<FulfillmentOutcome, FulfillmentError> {
    // At-least-once delivery guard: same session id means same purchase.
    if let Some(existing) = Order::find_by_session(pool, &checkout.session_id).await? {
        info!(
            order_id = %existing.id,
            session_id = %checkout.session_id,
            "Checkout session already fulfilled, skipping"
        );
        return Ok(FulfillmentOutcome::AlreadyProcessed {
            order_id: existing.id,
        });
    }

    let course = Course::find_by_id(pool, checkout.course_id)
        .await?
        .ok_or(FulfillmentError::CourseNotFound(checkout.course_id))?;

    let split = fees.split(checkout.amount_cents);
    let amount: i32 = checkout
        .amount_cents
        .try_into()
        .map_err(|_| FulfillmentError::InvalidAmount(checkout.amount_cents))?;
    let platform_fee: i32 = split
        .platform_fee_cents
        .try_into()
        .map_err(|_| FulfillmentError::InvalidAmount(split.platform_fee_cents))?;
    let creator_payout: i32 = split
        .creator_payout_cents
        .try_into()
        .map_err(|_| FulfillmentError::InvalidAmount(split.creator_payout_cents))?;

    // Order first, then enrollment, in one transaction: the enrollment's
    // parent reference always exists, and neither row is committed alone.
    let mut tx = pool.begin().await?;

    let (order_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO orders (user_id, course_id, payment_session_id, payment_intent_id,
                            amount_cents, platform_fee_cents, creator_payout_cents, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'completed')
        RETURNING id
        "#,
    )
    .bind(checkout.user_id)
    .bind(course.id)
    .bind(&checkout.session_id)
    .bind(&checkout.payment_intent_id)
    .bind(amount)
    .bind(platform_fee)
    .bind(creator_payout)
    .fetch_one(&mut *tx)
    .await?;

    let enrolled = sqlx::query(
        r#"
        INSERT INTO enrollments (user_id, course_id, order_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, course_id) DO NOTHING
        "#,
    )
    .bind(checkout.user_id)
    .bind(course.id)
    .bind(order_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let enrollment_created = enrolled.rows_affected() > 0;
    if enrollment_created {
        info!(
            order_id = %order_id,
            user_id = %checkout.user_id,
            course_id = %course.id,
            amount_cents = amount,
            platform_fee_cents = platform_fee,
            creator_payout_cents = creator_payout,
            "Checkout fulfilled"
        );
    } else {
        // Duplicate purchase of an already-owned course: the ledger entry
        // stands, access was already granted by an earlier order.
        warn!(
            order_id = %order_id,
            user_id = %checkout.user_id,
            course_id = %course.id,
            "User already enrolled; order recorded without a new enrollment"
        );
    }

    Ok(FulfillmentOutcome::Fulfilled {
        order_id,
        enrollment_created,
    })
}

/// Refunds a completed order and revokes its enrollment
///
/// The provider refund is issued before any internal write, so a provider
/// failure leaves no partial state. Refunding an already-refunded order is
/// rejected.
pub async fn refund_order(
    pool: &PgPool,
    payments: &PaymentClient,
    order_id: Uuid,
) -> Result<Order, FulfillmentError> {
    let order = Order::find_by_id(pool, order_id)
        .await?
        .ok_or(FulfillmentError::OrderNotFound(order_id))?;

    if order.status == OrderStatus::Refunded {
        return Err(FulfillmentError::AlreadyRefunded(order_id));
    }

    // External side effect first; internal state only flips once the
    // provider has accepted the refund.
    if let Some(payment_intent_id) = &order.payment_intent_id {
        payments
            .create_refund(payment_intent_id, i64::from(order.amount_cents))
            .await?;
    }

    let mut tx = pool.begin().await?;

    let refunded = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET status = 'refunded', updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, course_id, payment_session_id, payment_intent_id,
                  amount_cents, platform_fee_cents, creator_payout_cents,
                  status, paid_out, created_at, updated_at
        "#,
    )
    .bind(order_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM enrollments WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        order_id = %order_id,
        amount_cents = refunded.amount_cents,
        "Order refunded and enrollment revoked"
    );

    Ok(refunded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_equality() {
        let id = Uuid::new_v4();
        assert_eq!(
            FulfillmentOutcome::AlreadyProcessed { order_id: id },
            FulfillmentOutcome::AlreadyProcessed { order_id: id }
        );
        assert_ne!(
            FulfillmentOutcome::Fulfilled {
                order_id: id,
                enrollment_created: true
            },
            FulfillmentOutcome::AlreadyProcessed { order_id: id }
        );
    }

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        assert_eq!(
            FulfillmentError::AlreadyRefunded(id).to_string(),
            format!("Order {} is already refunded", id)
        );
    }
}
