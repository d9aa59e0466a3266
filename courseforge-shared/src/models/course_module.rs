/// Course module model and database operations
///
/// Modules are ordered groupings of lessons within a course. Only the owning
/// creator may create or edit them (enforced at the route layer via the
/// parent course's `creator_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Module model (named `CourseModule` to avoid clashing with the language keyword)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseModule {
    /// Unique module ID
    pub id: Uuid,

    /// Parent course
    pub course_id: Uuid,

    /// Module title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Sort position within the course
    pub position: i32,

    /// When the module was created
    pub created_at: DateTime<Utc>,

    /// When the module was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModule {
    /// Parent course
    pub course_id: Uuid,

    /// Module title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Sort position
    #[serde(default)]
    pub position: i32,
}

/// Input for updating a module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModule {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
}

impl CourseModule {
    /// Creates a new module
    pub async fn create(pool: &PgPool, data: CreateModule) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CourseModule>(
            r#"
            INSERT INTO course_modules (course_id, title, description, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, course_id, title, description, position, created_at, updated_at
            "#,
        )
        .bind(data.course_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    /// Finds a module by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CourseModule>(
            r#"
            SELECT id, course_id, title, description, position, created_at, updated_at
            FROM course_modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists modules for a course in display order
    pub async fn list_by_course(pool: &PgPool, course_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CourseModule>(
            r#"
            SELECT id, course_id, title, description, position, created_at, updated_at
            FROM course_modules
            WHERE course_id = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Updates a module
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateModule,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CourseModule>(
            r#"
            UPDATE course_modules
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                position = COALESCE($4, position),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, course_id, title, description, position, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.position)
        .fetch_optional(pool)
        .await
    }
}
