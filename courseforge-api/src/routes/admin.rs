/// Admin moderation endpoints
///
/// All handlers require the admin role. Creator-application review flips
/// the user's role atomically with the application row; course review
/// drives the draft → submitted → published/rejected state machine; refunds
/// reverse a completed order and revoke its enrollment.
///
/// # Endpoints
///
/// - `GET  /v1/admin/applications` - Pending creator applications
/// - `GET  /v1/admin/courses` - Courses awaiting review
/// - `POST /v1/admin/approve-creator` - Review a creator application
/// - `POST /v1/admin/approve-course` - Review a submitted course
/// - `POST /v1/admin/refund` - Refund an order

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use courseforge_shared::{
    auth::context::AuthContext,
    fulfillment,
    models::{course::Course, creator_application::CreatorApplication, order::Order},
    moderation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Creator application review request
#[derive(Debug, Deserialize)]
pub struct ApproveCreatorRequest {
    /// The applying user
    pub user_id: Uuid,

    /// Verdict: true publishes the approval, false rejects
    pub approved: bool,
}

/// Course review request
#[derive(Debug, Deserialize)]
pub struct ApproveCourseRequest {
    /// The submitted course
    pub course_id: Uuid,

    /// Verdict: true publishes, false rejects
    pub approved: bool,
}

/// Refund request
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    /// The order to refund
    pub order_id: Uuid,
}

/// Pending application list response
#[derive(Debug, Serialize)]
pub struct ApplicationsResponse {
    /// Applications awaiting review, oldest first
    pub applications: Vec<CreatorApplication>,
}

/// Review queue response
#[derive(Debug, Serialize)]
pub struct SubmittedCoursesResponse {
    /// Courses awaiting review, oldest first
    pub courses: Vec<Course>,
}

/// List pending creator applications
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApplicationsResponse>> {
    auth.require_admin()?;

    let applications = CreatorApplication::list_pending(&state.db).await?;

    Ok(Json(ApplicationsResponse { applications }))
}

/// List courses awaiting review
pub async fn list_submitted_courses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<SubmittedCoursesResponse>> {
    auth.require_admin()?;

    let courses = Course::list_submitted(&state.db).await?;

    Ok(Json(SubmittedCoursesResponse { courses }))
}

/// Review a creator application
///
/// Approval promotes the user to creator; the user and application rows
/// change in one transaction. A second review of the same application is
/// rejected with a conflict.
pub async fn approve_creator(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ApproveCreatorRequest>,
) -> ApiResult<Json<CreatorApplication>> {
    let admin = auth.require_admin()?;

    let application =
        moderation::review_application(&state.db, request.user_id, request.approved, admin.id)
            .await?;

    Ok(Json(application))
}

/// Review a submitted course
pub async fn approve_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ApproveCourseRequest>,
) -> ApiResult<Json<Course>> {
    auth.require_admin()?;

    let course = moderation::review_course(&state.db, request.course_id, request.approved).await?;

    Ok(Json(course))
}

/// Refund a completed order and revoke its enrollment
///
/// The provider refund goes out first; internal state only changes once the
/// provider accepts it. Already-refunded orders are rejected.
pub async fn refund(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<RefundRequest>,
) -> ApiResult<Json<Order>> {
    let admin = auth.require_admin()?;

    let order = fulfillment::refund_order(&state.db, &state.payments, request.order_id).await?;

    tracing::info!(
        order_id = %order.id,
        admin_id = %admin.id,
        amount_cents = order.amount_cents,
        "Refund processed"
    );

    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_request_deserialization() {
        let request: ApproveCreatorRequest = serde_json::from_str(
            r#"{"user_id":"2b7e1556-28ae-4d2a-abf7-158809cf4f3c","approved":true}"#,
        )
        .unwrap();
        assert!(request.approved);

        let request: ApproveCourseRequest = serde_json::from_str(
            r#"{"course_id":"2b7e1556-28ae-4d2a-abf7-158809cf4f3c","approved":false}"#,
        )
        .unwrap();
        assert!(!request.approved);
    }
}
