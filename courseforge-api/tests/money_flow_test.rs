/// Database-backed tests for the money-flow core
///
/// Covers the transactional guarantees around checkout fulfillment,
/// refunds, payout batching, and creator-application review. Requires
/// `DATABASE_URL`; each test skips when it is absent.

mod common;

use common::TestContext;
use courseforge_shared::fees::{FeeSchedule, DEFAULT_FEE_BASIS_POINTS};
use courseforge_shared::fulfillment::{
    fulfill_checkout, refund_order, FulfillmentError, FulfillmentOutcome, PaidCheckout,
};
use courseforge_shared::models::creator_application::{
    ApplicationStatus, CreateApplication, CreatorApplication,
};
use courseforge_shared::models::enrollment::Enrollment;
use courseforge_shared::models::order::{Order, OrderStatus};
use courseforge_shared::models::payout::Payout;
use courseforge_shared::models::user::{CreatorStatus, Role, User};
use courseforge_shared::moderation::{review_application, ModerationError};
use courseforge_shared::payouts::{
    run_payout_batch, PayoutPolicy, PayoutRunSummary, PAYOUT_BATCH_LOCK_KEY,
};
use uuid::Uuid;

fn paid_checkout(user_id: Uuid, course_id: Uuid, amount_cents: i64) -> PaidCheckout {
    PaidCheckout {
        user_id,
        course_id,
        amount_cents,
        payment_intent_id: Some(format!("pi_test_{}", Uuid::new_v4())),
        session_id: format!("cs_test_{}", Uuid::new_v4()),
    }
}

/// The provider delivers completion events at least once; a redelivered
/// session must not create a second order or enrollment.
#[tokio::test]
async fn test_duplicate_checkout_delivery_fulfills_once() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };
    let fees = FeeSchedule::new(DEFAULT_FEE_BASIS_POINTS);

    let creator = ctx.create_creator(None).await;
    let buyer = ctx.create_learner().await;
    let course = ctx.create_published_course(creator.id, 4_900).await;

    let checkout = paid_checkout(buyer.id, course.id, 4_900);

    let first = fulfill_checkout(&ctx.db, &fees, checkout.clone())
        .await
        .unwrap();
    let FulfillmentOutcome::Fulfilled {
        order_id,
        enrollment_created,
    } = first
    else {
        panic!("expected a fresh fulfillment, got {:?}", first);
    };
    assert!(enrollment_created);

    let second = fulfill_checkout(&ctx.db, &fees, checkout).await.unwrap();
    assert_eq!(second, FulfillmentOutcome::AlreadyProcessed { order_id });

    assert_eq!(
        Enrollment::count_by_course(&ctx.db, course.id).await.unwrap(),
        1
    );
    let order = Order::find_by_id(&ctx.db, order_id).await.unwrap().unwrap();
    assert_eq!(order.amount_cents, 4_900);
    assert_eq!(order.platform_fee_cents + order.creator_payout_cents, 4_900);

    ctx.cleanup(&[buyer.id, creator.id]).await;
}

/// A refund flips the order and revokes access in one transaction, and an
/// already-refunded order rejects a second refund before any provider call.
#[tokio::test]
async fn test_refund_revokes_enrollment_and_rejects_second_refund() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };
    let fees = FeeSchedule::new(DEFAULT_FEE_BASIS_POINTS);

    let creator = ctx.create_creator(None).await;
    let buyer = ctx.create_learner().await;
    let course = ctx.create_published_course(creator.id, 10_000).await;

    let outcome = fulfill_checkout(&ctx.db, &fees, paid_checkout(buyer.id, course.id, 10_000))
        .await
        .unwrap();
    let FulfillmentOutcome::Fulfilled { order_id, .. } = outcome else {
        panic!("expected a fresh fulfillment, got {:?}", outcome);
    };
    assert!(Enrollment::exists(&ctx.db, buyer.id, course.id).await.unwrap());

    let refunded = refund_order(&ctx.db, &ctx.payments, order_id).await.unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert!(!Enrollment::exists(&ctx.db, buyer.id, course.id).await.unwrap());

    let err = refund_order(&ctx.db, &ctx.payments, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, FulfillmentError::AlreadyRefunded(id) if id == order_id));

    ctx.cleanup(&[buyer.id, creator.id]).await;
}

/// One test covers the whole batch lifecycle so the advisory lock is never
/// contended across parallel tests: a run backs off while another holds the
/// lock, the first real run pays and sets the watermark, and a re-run over
/// the same window pays nothing.
#[tokio::test]
async fn test_payout_batch_watermark_and_lock() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };
    let fees = FeeSchedule::new(DEFAULT_FEE_BASIS_POINTS);
    let policy = PayoutPolicy::default();

    let creator = ctx.create_creator(Some("acct_stub_1")).await;
    let buyer = ctx.create_learner().await;
    let course = ctx.create_published_course(creator.id, 5_000).await;

    let outcome = fulfill_checkout(&ctx.db, &fees, paid_checkout(buyer.id, course.id, 5_000))
        .await
        .unwrap();
    let FulfillmentOutcome::Fulfilled { order_id, .. } = outcome else {
        panic!("expected a fresh fulfillment, got {:?}", outcome);
    };

    // A concurrent run holds the lock: the batch backs off without paying.
    let mut blocker = ctx.db.begin().await.unwrap();
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(PAYOUT_BATCH_LOCK_KEY)
        .execute(&mut *blocker)
        .await
        .unwrap();

    let contended = run_payout_batch(&ctx.db, &ctx.payments, &policy)
        .await
        .unwrap();
    assert_eq!(contended, PayoutRunSummary::default());
    assert!(Payout::list_by_creator(&ctx.db, creator.id)
        .await
        .unwrap()
        .is_empty());

    blocker.rollback().await.unwrap();

    // First uncontended run pays the creator share and sets the watermark.
    run_payout_batch(&ctx.db, &ctx.payments, &policy)
        .await
        .unwrap();

    let payouts = Payout::list_by_creator(&ctx.db, creator.id).await.unwrap();
    assert_eq!(payouts.len(), 1);
    // 5000 gross minus the 15% platform fee
    assert_eq!(payouts[0].amount_cents, 4_250);

    let order = Order::find_by_id(&ctx.db, order_id).await.unwrap().unwrap();
    assert!(order.paid_out);

    // Re-running over the same window finds nothing left to pay.
    run_payout_batch(&ctx.db, &ctx.payments, &policy)
        .await
        .unwrap();
    assert_eq!(
        Payout::list_by_creator(&ctx.db, creator.id)
            .await
            .unwrap()
            .len(),
        1
    );

    ctx.cleanup(&[buyer.id, creator.id]).await;
}

/// Approval flips the user's role and records the verdict together, and a
/// reviewed application rejects a second verdict.
#[tokio::test]
async fn test_application_review_is_atomic_and_terminal() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let admin = ctx.create_admin().await;
    let applicant = ctx.create_learner().await;

    CreatorApplication::create(
        &ctx.db,
        CreateApplication {
            user_id: applicant.id,
            bio: "Ten years of teaching".to_string(),
            reason: "Publish my courses".to_string(),
            social_links: None,
        },
    )
    .await
    .unwrap();

    let reviewed = review_application(&ctx.db, applicant.id, true, admin.id)
        .await
        .unwrap();
    assert_eq!(reviewed.status, ApplicationStatus::Approved);
    assert_eq!(reviewed.reviewed_by, Some(admin.id));

    let user = User::find_by_id(&ctx.db, applicant.id).await.unwrap().unwrap();
    assert_eq!(user.role, Role::Creator);
    assert_eq!(user.creator_status, Some(CreatorStatus::Approved));

    let err = review_application(&ctx.db, applicant.id, false, admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::AlreadyReviewed(id) if id == applicant.id));

    // The opposite verdict left nothing behind.
    let user = User::find_by_id(&ctx.db, applicant.id).await.unwrap().unwrap();
    assert_eq!(user.role, Role::Creator);

    ctx.cleanup(&[admin.id, applicant.id]).await;
}
