/// Lesson authoring endpoints
///
/// Lesson creation mints a direct-upload URL from the video platform: the
/// response carries the upload URL for the creator's browser, and the
/// provider's upload id is stored as the lesson's pending asset id until
/// the `video.upload.asset_created` webhook rewrites it.
///
/// # Endpoints
///
/// - `POST /v1/lessons` - Create a lesson with a direct upload (owner)
/// - `PATCH /v1/lessons/:id` - Update lesson metadata (owner)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use courseforge_shared::{
    auth::context::AuthContext,
    models::{
        course::Course,
        course_module::CourseModule,
        lesson::{CreateLesson, Lesson, UpdateLesson},
    },
    providers::payment::ProviderError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create lesson request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    /// Parent module
    pub module_id: Uuid,

    /// Lesson title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Sort position within the module
    #[serde(default)]
    pub position: i32,

    /// Whether the lesson is viewable without enrollment
    #[serde(default)]
    pub free_preview: bool,
}

/// Create lesson response
#[derive(Debug, Serialize)]
pub struct CreateLessonResponse {
    /// The created lesson (video fields pending until webhooks arrive)
    pub lesson: Lesson,

    /// URL the creator's browser uploads the video to
    pub upload_url: String,
}

/// Update lesson request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub position: Option<i32>,

    pub free_preview: Option<bool>,
}

/// Resolves a module's parent course and checks the caller owns it
async fn owned_module(
    state: &AppState,
    module_id: Uuid,
    creator_id: Uuid,
) -> ApiResult<CourseModule> {
    let module = CourseModule::find_by_id(&state.db, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Module {} not found", module_id)))?;

    let course = Course::find_by_id(&state.db, module.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", module.course_id)))?;

    if course.creator_id != creator_id {
        return Err(ApiError::Forbidden("You do not own this course".to_string()));
    }

    Ok(module)
}

/// Create a lesson and mint a direct video upload (owner only)
///
/// The provider call happens before any internal write so a provider
/// failure leaves no half-created lesson.
pub async fn create_lesson(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateLessonRequest>,
) -> ApiResult<Json<CreateLessonResponse>> {
    let creator = auth.require_creator()?;
    request.validate()?;

    let module = owned_module(&state, request.module_id, creator.id).await?;

    let upload = state.video.create_direct_upload().await.map_err(|e| match e {
        ProviderError::Unconfigured => {
            ApiError::ServiceUnavailable("Video uploads are not configured".to_string())
        }
        other => other.into(),
    })?;

    let lesson = Lesson::create(
        &state.db,
        CreateLesson {
            module_id: module.id,
            title: request.title,
            description: request.description,
            position: request.position,
            video_asset_id: Some(upload.id.clone()),
            free_preview: request.free_preview,
        },
    )
    .await?;

    tracing::info!(
        lesson_id = %lesson.id,
        module_id = %module.id,
        upload_id = %upload.id,
        "Lesson created with pending video upload"
    );

    Ok(Json(CreateLessonResponse {
        lesson,
        upload_url: upload.url,
    }))
}

/// Update lesson metadata (owner only)
pub async fn update_lesson(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(lesson_id): Path<Uuid>,
    Json(request): Json<UpdateLessonRequest>,
) -> ApiResult<Json<Lesson>> {
    let creator = auth.require_creator()?;
    request.validate()?;

    let lesson = Lesson::find_by_id(&state.db, lesson_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lesson {} not found", lesson_id)))?;

    owned_module(&state, lesson.module_id, creator.id).await?;

    let updated = Lesson::update(
        &state.db,
        lesson_id,
        UpdateLesson {
            title: request.title,
            description: request.description,
            position: request.position,
            free_preview: request.free_preview,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Lesson {} not found", lesson_id)))?;

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_lesson_request_validation() {
        let valid = CreateLessonRequest {
            module_id: Uuid::new_v4(),
            title: "Ownership".to_string(),
            description: None,
            position: 1,
            free_preview: false,
        };
        assert!(valid.validate().is_ok());

        let empty_title = CreateLessonRequest {
            title: String::new(),
            ..valid
        };
        assert!(empty_title.validate().is_err());
    }

    #[test]
    fn test_create_lesson_request_defaults() {
        let request: CreateLessonRequest = serde_json::from_str(
            r#"{"module_id":"00000000-0000-0000-0000-000000000000","title":"Intro"}"#,
        )
        .unwrap();
        assert_eq!(request.position, 0);
        assert!(!request.free_preview);
    }
}
