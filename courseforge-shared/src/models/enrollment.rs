/// Enrollment model and database operations
///
/// An enrollment grants a learner access to a course. The
/// `UNIQUE (user_id, course_id)` constraint is the safety net against
/// concurrent checkouts for the same pair; enrollment creation in the
/// fulfillment workflow uses `ON CONFLICT DO NOTHING` so a constraint hit is
/// reported as "already enrolled" rather than an error. Every enrollment
/// references its parent order; refunding the order deletes the enrollment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Enrollment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Enrollment {
    /// Unique enrollment ID
    pub id: Uuid,

    /// Enrolled user
    pub user_id: Uuid,

    /// Course the user has access to
    pub course_id: Uuid,

    /// Order that paid for this enrollment
    pub order_id: Uuid,

    /// When access was granted
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    /// Checks whether a user is enrolled in a course
    pub async fn exists(pool: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists a user's enrollments, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT id, user_id, course_id, order_id, created_at
            FROM enrollments
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Counts enrollments for a course
    pub async fn count_by_course(pool: &PgPool, course_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
                .bind(course_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
