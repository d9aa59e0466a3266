/// Course model and database operations
///
/// Courses are the sellable units of the marketplace. They move through a
/// moderation state machine; only PUBLISHED courses appear in the catalog
/// and can be purchased.
///
/// # State Machine
///
/// ```text
/// draft → submitted → published
///                   → rejected → submitted   (resubmission after revisions)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE course_status AS ENUM ('draft', 'submitted', 'published', 'rejected');
///
/// CREATE TABLE courses (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     creator_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     description TEXT NOT NULL,
///     price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
///     category VARCHAR(100),
///     tags JSONB NOT NULL DEFAULT '[]',
///     thumbnail_url VARCHAR(2048),
///     status course_status NOT NULL DEFAULT 'draft',
///     published_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Course moderation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "course_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    /// Being edited by the creator, not visible to learners
    Draft,

    /// Submitted for admin review
    Submitted,

    /// Live in the catalog and purchasable
    Published,

    /// Rejected by an admin; may be revised and resubmitted
    Rejected,
}

impl CourseStatus {
    /// Converts status to string for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Submitted => "submitted",
            CourseStatus::Published => "published",
            CourseStatus::Rejected => "rejected",
        }
    }

    /// Checks if transition to target state is valid
    pub fn can_transition_to(&self, target: CourseStatus) -> bool {
        match (self, target) {
            // Creator submits a draft for review
            (CourseStatus::Draft, CourseStatus::Submitted) => true,

            // Resubmission after rejection
            (CourseStatus::Rejected, CourseStatus::Submitted) => true,

            // Admin review verdicts
            (CourseStatus::Submitted, CourseStatus::Published) => true,
            (CourseStatus::Submitted, CourseStatus::Rejected) => true,

            _ => false,
        }
    }
}

/// Course model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    /// Unique course ID
    pub id: Uuid,

    /// Owning creator
    pub creator_id: Uuid,

    /// Course title
    pub title: String,

    /// URL-friendly unique identifier derived from the title
    pub slug: String,

    /// Long-form description
    pub description: String,

    /// Price in integer cents
    pub price_cents: i32,

    /// Optional category for filtering
    pub category: Option<String>,

    /// Free-form tag list
    pub tags: JsonValue,

    /// Thumbnail image URL
    pub thumbnail_url: Option<String>,

    /// Moderation state
    pub status: CourseStatus,

    /// Set when published, cleared on rejection
    pub published_at: Option<DateTime<Utc>>,

    /// When the course was created
    pub created_at: DateTime<Utc>,

    /// When the course was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourse {
    /// Owning creator
    pub creator_id: Uuid,

    /// Course title (slug is derived from this)
    pub title: String,

    /// Long-form description
    pub description: String,

    /// Price in integer cents
    pub price_cents: i32,

    /// Optional category
    pub category: Option<String>,

    /// Tag list
    #[serde(default)]
    pub tags: Vec<String>,

    /// Thumbnail image URL
    pub thumbnail_url: Option<String>,
}

/// Input for updating course metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    pub category: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Filters for listing catalog courses
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    /// Restrict to a category
    pub category: Option<String>,

    /// Case-insensitive substring match on title/description
    pub search: Option<String>,
}

/// Converts a title into a URL-friendly slug
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens,
/// and trims leading/trailing hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true; // suppress leading hyphen

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

impl Course {
    /// Creates a new draft course with a unique slug
    ///
    /// Slug collisions are resolved by appending a numeric suffix
    /// (`rust-basics`, `rust-basics-1`, `rust-basics-2`, ...).
    pub async fn create(pool: &PgPool, data: CreateCourse) -> Result<Self, sqlx::Error> {
        let base_slug = slugify(&data.title);
        let mut slug = base_slug.clone();
        let mut counter = 1;

        while Self::find_by_slug(pool, &slug).await?.is_some() {
            slug = format!("{}-{}", base_slug, counter);
            counter += 1;
        }

        sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (creator_id, title, slug, description, price_cents,
                                 category, tags, thumbnail_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, creator_id, title, slug, description, price_cents,
                      category, tags, thumbnail_url, status, published_at,
                      created_at, updated_at
            "#,
        )
        .bind(data.creator_id)
        .bind(data.title)
        .bind(slug)
        .bind(data.description)
        .bind(data.price_cents)
        .bind(data.category)
        .bind(serde_json::json!(data.tags))
        .bind(data.thumbnail_url)
        .fetch_one(pool)
        .await
    }

    /// Finds a course by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, creator_id, title, slug, description, price_cents,
                   category, tags, thumbnail_url, status, published_at,
                   created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a course by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, creator_id, title, slug, description, price_cents,
                   category, tags, thumbnail_url, status, published_at,
                   created_at, updated_at
            FROM courses
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    /// Lists published courses for the catalog, newest first
    pub async fn list_published(
        pool: &PgPool,
        filter: &CourseFilter,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, creator_id, title, slug, description, price_cents,
                   category, tags, thumbnail_url, status, published_at,
                   created_at, updated_at
            FROM courses
            WHERE status = 'published'
              AND ($1::VARCHAR IS NULL OR category = $1)
              AND ($2::VARCHAR IS NULL
                   OR title ILIKE '%' || $2 || '%'
                   OR description ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(&filter.category)
        .bind(&filter.search)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Lists courses awaiting review, oldest first
    pub async fn list_submitted(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, creator_id, title, slug, description, price_cents,
                   category, tags, thumbnail_url, status, published_at,
                   created_at, updated_at
            FROM courses
            WHERE status = 'submitted'
            ORDER BY updated_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists all courses owned by a creator, newest first
    pub async fn list_by_creator(pool: &PgPool, creator_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, creator_id, title, slug, description, price_cents,
                   category, tags, thumbnail_url, status, published_at,
                   created_at, updated_at
            FROM courses
            WHERE creator_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(pool)
        .await
    }

    /// Updates course metadata
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCourse,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                price_cents = COALESCE($4, price_cents),
                category = COALESCE($5, category),
                thumbnail_url = COALESCE($6, thumbnail_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, creator_id, title, slug, description, price_cents,
                      category, tags, thumbnail_url, status, published_at,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.price_cents)
        .bind(data.category)
        .bind(data.thumbnail_url)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Rust Basics"), "rust-basics");
        assert_eq!(slugify("  Async & Await!  "), "async-await");
        assert_eq!(slugify("C++ for Beginners"), "c-for-beginners");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn test_valid_transitions() {
        use CourseStatus::*;

        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Published));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(Submitted));
    }

    #[test]
    fn test_invalid_transitions() {
        use CourseStatus::*;

        // Published only from submitted
        assert!(!Draft.can_transition_to(Published));
        assert!(!Rejected.can_transition_to(Published));

        // No double submission, no un-publishing
        assert!(!Submitted.can_transition_to(Submitted));
        assert!(!Published.can_transition_to(Draft));
        assert!(!Published.can_transition_to(Submitted));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&CourseStatus::Published).unwrap(),
            "\"published\""
        );
        assert_eq!(CourseStatus::Draft.as_str(), "draft");
    }
}
