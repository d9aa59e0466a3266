/// Creator application model and database operations
///
/// A learner submits at most one application to become a creator. The row is
/// unique per user; review (approve/reject) is terminal and is performed by
/// the moderation workflow, which also flips the user's role atomically.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE application_status AS ENUM ('pending', 'approved', 'rejected');
///
/// CREATE TABLE creator_applications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     bio TEXT NOT NULL,
///     reason TEXT NOT NULL,
///     social_links JSONB,
///     status application_status NOT NULL DEFAULT 'pending',
///     reviewed_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     reviewed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Application review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting admin review
    Pending,

    /// Approved; the user became a creator
    Approved,

    /// Rejected; the user remains a learner
    Rejected,
}

impl ApplicationStatus {
    /// Checks if the application has been reviewed
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }
}

/// Creator application model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CreatorApplication {
    /// Unique application ID
    pub id: Uuid,

    /// Applying user (unique — one application per user, ever)
    pub user_id: Uuid,

    /// Applicant biography
    pub bio: String,

    /// Why the applicant wants to teach
    pub reason: String,

    /// Optional social/profile links
    pub social_links: Option<JsonValue>,

    /// Review state
    pub status: ApplicationStatus,

    /// Admin who reviewed the application
    pub reviewed_by: Option<Uuid>,

    /// When the review happened
    pub reviewed_at: Option<DateTime<Utc>>,

    /// When the application was submitted
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplication {
    /// Applying user
    pub user_id: Uuid,

    /// Applicant biography
    pub bio: String,

    /// Why the applicant wants to teach
    pub reason: String,

    /// Optional social/profile links
    pub social_links: Option<JsonValue>,
}

impl CreatorApplication {
    /// Creates a new pending application
    ///
    /// # Errors
    ///
    /// Fails with a unique-constraint violation if the user already has an
    /// application in any state.
    pub async fn create(pool: &PgPool, data: CreateApplication) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CreatorApplication>(
            r#"
            INSERT INTO creator_applications (user_id, bio, reason, social_links)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, bio, reason, social_links, status,
                      reviewed_by, reviewed_at, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.bio)
        .bind(data.reason)
        .bind(data.social_links)
        .fetch_one(pool)
        .await
    }

    /// Finds the application for a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CreatorApplication>(
            r#"
            SELECT id, user_id, bio, reason, social_links, status,
                   reviewed_by, reviewed_at, created_at
            FROM creator_applications
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists applications awaiting review, oldest first
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CreatorApplication>(
            r#"
            SELECT id, user_id, bio, reason, social_links, status,
                   reviewed_by, reviewed_at, created_at
            FROM creator_applications
            WHERE status = 'pending'
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!ApplicationStatus::Pending.is_terminal());
        assert!(ApplicationStatus::Approved.is_terminal());
        assert!(ApplicationStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
