/// Lesson model and database operations
///
/// A lesson is a single playable unit backed by the external video platform.
/// Video fields are populated asynchronously:
///
/// 1. Creation stores the provider's *upload id* in `video_asset_id`.
/// 2. The `video.upload.asset_created` webhook rewrites it to the minted
///    *asset id* (two-phase identifier handoff).
/// 3. The `video.asset.ready` webhook stamps `video_playback_id` and the
///    rounded duration.
///
/// All identifiers are opaque provider-owned strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Lesson model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lesson {
    /// Unique lesson ID
    pub id: Uuid,

    /// Parent module
    pub module_id: Uuid,

    /// Lesson title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Sort position within the module
    pub position: i32,

    /// Provider upload id until the asset is minted, then the asset id
    pub video_asset_id: Option<String>,

    /// Playback id, set when the asset is ready
    pub video_playback_id: Option<String>,

    /// Whether the lesson is viewable without enrollment
    pub free_preview: bool,

    /// Video duration in whole seconds, set when the asset is ready
    pub duration_seconds: Option<i32>,

    /// When the lesson was created
    pub created_at: DateTime<Utc>,

    /// When the lesson was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLesson {
    /// Parent module
    pub module_id: Uuid,

    /// Lesson title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Sort position
    #[serde(default)]
    pub position: i32,

    /// Provider upload id (pending asset identifier)
    pub video_asset_id: Option<String>,

    /// Whether the lesson is a free preview
    #[serde(default)]
    pub free_preview: bool,
}

/// Input for updating lesson metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLesson {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub free_preview: Option<bool>,
}

impl Lesson {
    /// Creates a new lesson
    pub async fn create(pool: &PgPool, data: CreateLesson) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (module_id, title, description, position,
                                 video_asset_id, free_preview)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, module_id, title, description, position,
                      video_asset_id, video_playback_id, free_preview,
                      duration_seconds, created_at, updated_at
            "#,
        )
        .bind(data.module_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.position)
        .bind(data.video_asset_id)
        .bind(data.free_preview)
        .fetch_one(pool)
        .await
    }

    /// Finds a lesson by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, module_id, title, description, position,
                   video_asset_id, video_playback_id, free_preview,
                   duration_seconds, created_at, updated_at
            FROM lessons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a lesson by its stored provider asset (or pending upload) id
    pub async fn find_by_video_asset(
        pool: &PgPool,
        video_asset_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, module_id, title, description, position,
                   video_asset_id, video_playback_id, free_preview,
                   duration_seconds, created_at, updated_at
            FROM lessons
            WHERE video_asset_id = $1
            "#,
        )
        .bind(video_asset_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists lessons for a module in display order
    pub async fn list_by_module(pool: &PgPool, module_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, module_id, title, description, position,
                   video_asset_id, video_playback_id, free_preview,
                   duration_seconds, created_at, updated_at
            FROM lessons
            WHERE module_id = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(module_id)
        .fetch_all(pool)
        .await
    }

    /// Updates lesson metadata
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateLesson,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lesson>(
            r#"
            UPDATE lessons
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                position = COALESCE($4, position),
                free_preview = COALESCE($5, free_preview),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, module_id, title, description, position,
                      video_asset_id, video_playback_id, free_preview,
                      duration_seconds, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.position)
        .bind(data.free_preview)
        .fetch_optional(pool)
        .await
    }

    /// Rewrites the stored upload id to the minted asset id
    ///
    /// Applied on the provider's `video.upload.asset_created` event.
    pub async fn reassign_video_asset(
        pool: &PgPool,
        id: Uuid,
        asset_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lessons SET video_asset_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(asset_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps the ready playback id and duration
    ///
    /// Applied on the provider's `video.asset.ready` event.
    pub async fn mark_video_ready(
        pool: &PgPool,
        id: Uuid,
        playback_id: &str,
        duration_seconds: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE lessons
            SET video_playback_id = $2, duration_seconds = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(playback_id)
        .bind(duration_seconds)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
