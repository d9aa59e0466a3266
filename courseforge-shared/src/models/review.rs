/// Review model and database operations
///
/// Learners may rate a course they purchased, once per course
/// (`UNIQUE (course_id, user_id)`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Review model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    /// Unique review ID
    pub id: Uuid,

    /// Reviewed course
    pub course_id: Uuid,

    /// Reviewing user
    pub user_id: Uuid,

    /// Rating, 1 through 5
    pub rating: i32,

    /// Optional free-form comment
    pub comment: Option<String>,

    /// When the review was posted
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

impl Review {
    /// Creates a review
    ///
    /// Fails with a unique-constraint violation if the user already reviewed
    /// the course.
    pub async fn create(pool: &PgPool, data: CreateReview) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (course_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, course_id, user_id, rating, comment, created_at
            "#,
        )
        .bind(data.course_id)
        .bind(data.user_id)
        .bind(data.rating)
        .bind(data.comment)
        .fetch_one(pool)
        .await
    }

    /// Lists reviews for a course, newest first
    pub async fn list_by_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, course_id, user_id, rating, comment, created_at
            FROM reviews
            WHERE course_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Average rating for a course, if any reviews exist
    pub async fn average_rating(pool: &PgPool, course_id: Uuid) -> Result<Option<f64>, sqlx::Error> {
        let (avg,): (Option<f64>,) = sqlx::query_as(
            "SELECT AVG(rating)::DOUBLE PRECISION FROM reviews WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await?;

        Ok(avg)
    }
}
