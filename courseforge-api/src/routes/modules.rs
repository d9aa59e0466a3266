/// Course module authoring endpoints
///
/// Modules group lessons within a course. All operations are owner-checked
/// through the parent course.
///
/// # Endpoints
///
/// - `POST /v1/courses/:id/modules` - Create a module (owner)
/// - `PATCH /v1/modules/:id` - Update a module (owner)

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
        course_module::{CourseModule, CreateModule, UpdateModule},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create module request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModuleRequest {
    /// Module title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Sort position within the course
    #[serde(default)]
    pub position: i32,
}

/// Update module request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateModuleRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub position: Option<i32>,
}

/// Resolves a course and checks the caller owns it
async fn owned_course(
    state: &AppState,
    course_id: Uuid,
    creator_id: Uuid,
) -> ApiResult<Course> {
    let course = Course::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

    if course.creator_id != creator_id {
        return Err(ApiError::Forbidden("You do not own this course".to_string()));
    }

    Ok(course)
}

/// Create a module in a course (owner only)
pub async fn create_module(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<CreateModuleRequest>,
) -> ApiResult<Json<CourseModule>> {
    let creator = auth.require_creator()?;
    request.validate()?;

    let course = owned_course(&state, course_id, creator.id).await?;

    let module = CourseModule::create(
        &state.db,
        CreateModule {
            course_id: course.id,
            title: request.title,
            description: request.description,
            position: request.position,
        },
    )
    .await?;

    Ok(Json(module))
}

/// Update a module (owner only)
pub async fn update_module(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(module_id): Path<Uuid>,
    Json(request): Json<UpdateModuleRequest>,
) -> ApiResult<Json<CourseModule>> {
    let creator = auth.require_creator()?;
    request.validate()?;

    let module = CourseModule::find_by_id(&state.db, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Module {} not found", module_id)))?;

    owned_course(&state, module.course_id, creator.id).await?;

    let updated = CourseModule::update(
        &state.db,
        module_id,
        UpdateModule {
            title: request.title,
            description: request.description,
            position: request.position,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Module {} not found", module_id)))?;

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_module_request_validation() {
        let valid = CreateModuleRequest {
            title: "Getting Started".to_string(),
            description: None,
            position: 0,
        };
        assert!(valid.validate().is_ok());

        let empty_title = CreateModuleRequest {
            title: String::new(),
            description: None,
            position: 0,
        };
        assert!(empty_title.validate().is_err());
    }
}
