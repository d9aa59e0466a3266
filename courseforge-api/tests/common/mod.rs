/// Common fixtures for database-backed integration tests
///
/// Tests connect to the database named by `DATABASE_URL` and run the
/// embedded migrations. When the variable is not set every test skips
/// instead of failing, so the suite stays runnable without infrastructure.
///
/// The payment provider is a local stub server speaking just enough of the
/// REST surface (refunds, transfers) for the money-flow paths under test.

use courseforge_shared::models::course::{Course, CreateCourse};
use courseforge_shared::models::user::{IdentityProfile, User};
use courseforge_shared::providers::payment::{PaymentClient, PaymentConfig};
use sqlx::PgPool;
use uuid::Uuid;

/// Test context: a live database pool and a stub-backed payment client
pub struct TestContext {
    pub db: PgPool,
    pub payments: PaymentClient,
}

impl TestContext {
    /// Connects and migrates; `None` when `DATABASE_URL` is not set
    pub async fn try_new() -> Option<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("DATABASE_URL not set, skipping integration test");
                return None;
            }
        };

        let db = PgPool::connect(&url).await.unwrap();

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../courseforge-shared/migrations")
            .run(&db)
            .await
            .unwrap();

        let payments = spawn_payment_stub().await;

        Some(TestContext { db, payments })
    }

    /// Creates a fresh learner with a unique identity
    pub async fn create_learner(&self) -> User {
        let tag = Uuid::new_v4();
        User::upsert_from_identity(
            &self.db,
            &IdentityProfile {
                identity_id: format!("idp_{}", tag),
                email: format!("user-{}@example.com", tag),
                name: Some("Test User".to_string()),
            },
        )
        .await
        .unwrap()
    }

    /// Creates an approved creator, optionally with a payout account
    pub async fn create_creator(&self, payout_account: Option<&str>) -> User {
        let user = self.create_learner().await;

        sqlx::query(
            r#"
            UPDATE users
            SET role = 'creator', creator_status = 'approved', payout_account_id = $2
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(payout_account)
        .execute(&self.db)
        .await
        .unwrap();

        User::find_by_id(&self.db, user.id).await.unwrap().unwrap()
    }

    /// Creates an admin user
    pub async fn create_admin(&self) -> User {
        let user = self.create_learner().await;

        sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await
            .unwrap();

        User::find_by_id(&self.db, user.id).await.unwrap().unwrap()
    }

    /// Creates a course and publishes it directly
    pub async fn create_published_course(&self, creator_id: Uuid, price_cents: i32) -> Course {
        let course = Course::create(
            &self.db,
            CreateCourse {
                creator_id,
                title: format!("Course {}", Uuid::new_v4()),
                description: "Integration fixture".to_string(),
                price_cents,
                category: None,
                tags: Vec::new(),
                thumbnail_url: None,
            },
        )
        .await
        .unwrap();

        sqlx::query("UPDATE courses SET status = 'published', published_at = NOW() WHERE id = $1")
            .bind(course.id)
            .execute(&self.db)
            .await
            .unwrap();

        Course::find_by_id(&self.db, course.id).await.unwrap().unwrap()
    }

    /// Deletes the given users; cascades remove their applications, courses,
    /// orders, enrollments, payouts, and reviews
    pub async fn cleanup(&self, user_ids: &[Uuid]) {
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(user_ids)
            .execute(&self.db)
            .await
            .unwrap();
    }
}

/// Spawns a loopback payment-provider stub and returns a client aimed at it
async fn spawn_payment_stub() -> PaymentClient {
    use axum::{routing::post, Json, Router};

    let app = Router::new()
        .route(
            "/v1/refunds",
            post(|| async { Json(serde_json::json!({ "id": "re_stub" })) }),
        )
        .route(
            "/v1/transfers",
            post(|| async { Json(serde_json::json!({ "id": "tr_stub" })) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    PaymentClient::from_config(&PaymentConfig {
        secret_key: Some("sk_test_stub".to_string()),
        api_base: format!("http://{}", addr),
    })
}
