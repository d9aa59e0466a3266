/// Course catalog and authoring endpoints
///
/// Public catalog reads plus creator-only authoring writes. Only PUBLISHED
/// courses are visible in the catalog; authoring operations are
/// owner-checked against the parent course.
///
/// # Endpoints
///
/// - `GET  /v1/courses` - List published courses (public)
/// - `GET  /v1/courses/:id` - Course detail with curriculum and reviews (public)
/// - `POST /v1/courses` - Create a draft course (approved creator)
/// - `PATCH /v1/courses/:id` - Update course metadata (owner)
/// - `POST /v1/courses/:id/submit` - Submit for review (owner)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use courseforge_shared::{
    auth::context::AuthContext,
    models::{
        course::{Course, CourseFilter, CreateCourse, UpdateCourse},
        course_module::CourseModule,
        enrollment::Enrollment,
        lesson::Lesson,
        review::Review,
    },
    moderation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default and maximum catalog page sizes
const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

/// Catalog list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListCoursesQuery {
    /// Restrict to a category
    pub category: Option<String>,

    /// Case-insensitive substring match on title/description
    pub search: Option<String>,

    /// Maximum number of results (default 50, capped at 100)
    pub limit: Option<i64>,
}

/// Catalog list response
#[derive(Debug, Serialize)]
pub struct ListCoursesResponse {
    /// Published courses, newest first
    pub courses: Vec<Course>,
}

/// A module with its ordered lessons
#[derive(Debug, Serialize)]
pub struct ModuleDetail {
    #[serde(flatten)]
    pub module: CourseModule,

    /// Lessons in display order
    pub lessons: Vec<Lesson>,
}

/// Course detail response
#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: Course,

    /// Curriculum in display order
    pub modules: Vec<ModuleDetail>,

    /// Reviews, newest first
    pub reviews: Vec<Review>,

    /// Average rating, if any reviews exist
    pub average_rating: Option<f64>,

    /// Number of enrolled learners
    pub enrollment_count: i64,
}

/// Create course request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    /// Course title (the slug is derived from this)
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Long-form description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Price in integer cents
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: i32,

    /// Optional category
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    /// Free-form tag list
    #[serde(default)]
    pub tags: Vec<String>,

    /// Thumbnail image URL
    #[validate(url(message = "Thumbnail must be a valid URL"))]
    pub thumbnail_url: Option<String>,
}

/// Update course request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: Option<i32>,

    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,

    #[validate(url(message = "Thumbnail must be a valid URL"))]
    pub thumbnail_url: Option<String>,
}

/// List published courses (public)
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> ApiResult<Json<ListCoursesResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let filter = CourseFilter {
        category: query.category,
        search: query.search,
    };

    let courses = Course::list_published(&state.db, &filter, limit).await?;

    Ok(Json(ListCoursesResponse { courses }))
}

/// Get a published course with its curriculum and reviews (public)
///
/// Unpublished courses are reported as not found so drafts never leak
/// through the public catalog.
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<CourseDetailResponse>> {
    let course = Course::find_by_id(&state.db, course_id)
        .await?
        .filter(|c| c.status == courseforge_shared::models::course::CourseStatus::Published)
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

    let mut modules = Vec::new();
    for module in CourseModule::list_by_course(&state.db, course.id).await? {
        let lessons = Lesson::list_by_module(&state.db, module.id).await?;
        modules.push(ModuleDetail { module, lessons });
    }

    let reviews = Review::list_by_course(&state.db, course.id).await?;
    let average_rating = Review::average_rating(&state.db, course.id).await?;
    let enrollment_count = Enrollment::count_by_course(&state.db, course.id).await?;

    Ok(Json(CourseDetailResponse {
        course,
        modules,
        reviews,
        average_rating,
        enrollment_count,
    }))
}

/// Create a draft course (approved creator only)
pub async fn create_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateCourseRequest>,
) -> ApiResult<Json<Course>> {
    let creator = auth.require_creator()?;
    request.validate()?;

    let course = Course::create(
        &state.db,
        CreateCourse {
            creator_id: creator.id,
            title: request.title,
            description: request.description,
            price_cents: request.price_cents,
            category: request.category,
            tags: request.tags,
            thumbnail_url: request.thumbnail_url,
        },
    )
    .await?;

    tracing::info!(course_id = %course.id, creator_id = %creator.id, slug = %course.slug, "Course created");

    Ok(Json(course))
}

/// Update course metadata (owner only)
pub async fn update_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<UpdateCourseRequest>,
) -> ApiResult<Json<Course>> {
    let creator = auth.require_creator()?;
    request.validate()?;

    let course = Course::find_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

    if course.creator_id != creator.id {
        return Err(ApiError::Forbidden("You do not own this course".to_string()));
    }

    let updated = Course::update(
        &state.db,
        course_id,
        UpdateCourse {
            title: request.title,
            description: request.description,
            price_cents: request.price_cents,
            category: request.category,
            thumbnail_url: request.thumbnail_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

    Ok(Json(updated))
}

/// Submit a course for admin review (owner only)
///
/// Allowed from `draft` and, for resubmission after revisions, from
/// `rejected`.
pub async fn submit_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<Course>> {
    let creator = auth.require_creator()?;

    let course = moderation::submit_course(&state.db, course_id, creator.id).await?;

    Ok(Json(course))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_course_request_validation() {
        let valid = CreateCourseRequest {
            title: "Rust Basics".to_string(),
            description: "An introduction to Rust.".to_string(),
            price_cents: 4_900,
            category: Some("programming".to_string()),
            tags: vec!["rust".to_string()],
            thumbnail_url: Some("https://cdn.example.com/thumb.png".to_string()),
        };
        assert!(valid.validate().is_ok());

        let negative_price = CreateCourseRequest {
            price_cents: -1,
            ..valid_request()
        };
        assert!(negative_price.validate().is_err());

        let empty_title = CreateCourseRequest {
            title: String::new(),
            ..valid_request()
        };
        assert!(empty_title.validate().is_err());

        let bad_url = CreateCourseRequest {
            thumbnail_url: Some("not a url".to_string()),
            ..valid_request()
        };
        assert!(bad_url.validate().is_err());
    }

    fn valid_request() -> CreateCourseRequest {
        CreateCourseRequest {
            title: "Rust Basics".to_string(),
            description: "An introduction to Rust.".to_string(),
            price_cents: 4_900,
            category: None,
            tags: vec![],
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_update_request_allows_partial_payloads() {
        let request = UpdateCourseRequest {
            title: None,
            description: None,
            price_cents: Some(5_900),
            category: None,
            thumbnail_url: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListCoursesQuery = serde_json::from_str("{}").unwrap();
        assert!(query.category.is_none());
        assert!(query.search.is_none());
        assert!(query.limit.is_none());
    }
}
