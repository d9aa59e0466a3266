/// Course review endpoints
///
/// Enrolled learners may rate a course once; the unique constraint on
/// (course_id, user_id) backs the one-review rule under concurrency.
///
/// # Endpoints
///
/// - `POST /v1/reviews` - Post a review (enrolled learners only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use courseforge_shared::{
    auth::context::AuthContext,
    models::{
        enrollment::Enrollment,
        review::{CreateReview, Review},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create review request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    /// Reviewed course
    pub course_id: Uuid,

    /// Rating, 1 through 5
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    /// Optional free-form comment
    #[validate(length(max = 5000, message = "Comment must be at most 5000 characters"))]
    pub comment: Option<String>,
}

/// Post a review for an enrolled course
pub async fn create_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateReviewRequest>,
) -> ApiResult<Json<Review>> {
    request.validate()?;
    let user = &auth.user;

    if !Enrollment::exists(&state.db, user.id, request.course_id).await? {
        return Err(ApiError::Forbidden(
            "Only enrolled learners can review a course".to_string(),
        ));
    }

    let review = Review::create(
        &state.db,
        CreateReview {
            course_id: request.course_id,
            user_id: user.id,
            rating: request.rating,
            comment: request.comment,
        },
    )
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.constraint().is_some() => {
            ApiError::Conflict("You have already reviewed this course".to_string())
        }
        _ => e.into(),
    })?;

    Ok(Json(review))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let base = CreateReviewRequest {
            course_id: Uuid::new_v4(),
            rating: 5,
            comment: None,
        };
        assert!(base.validate().is_ok());

        let too_low = CreateReviewRequest { rating: 0, ..base };
        assert!(too_low.validate().is_err());

        let too_high = CreateReviewRequest {
            rating: 6,
            course_id: Uuid::new_v4(),
            comment: None,
        };
        assert!(too_high.validate().is_err());
    }
}
