/// Checkout endpoint
///
/// Creates a hosted checkout session at the payment provider for a
/// published course. Preconditions are checked before the provider call:
/// the course must be published, the caller must not already be enrolled,
/// and the creator must have completed payee onboarding. The external
/// session creation precedes any internal write; the order itself is only
/// recorded when the provider's completion webhook arrives.
///
/// # Endpoint
///
/// - `POST /v1/checkout` - Create a checkout session, returns `{url}`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use courseforge_shared::{
    auth::context::AuthContext,
    models::{
        course::{Course, CourseStatus},
        enrollment::Enrollment,
        user::User,
    },
    providers::payment::CheckoutSessionRequest,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Checkout request
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Course to purchase
    pub course_id: Uuid,
}

/// Checkout response
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Hosted payment page URL to redirect the buyer to
    pub url: String,
}

/// Create a hosted checkout session (authenticated)
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let buyer = &auth.user;

    let course = Course::find_by_id(&state.db, request.course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", request.course_id)))?;

    if course.status != CourseStatus::Published {
        return Err(ApiError::NotFound(format!(
            "Course {} not found",
            request.course_id
        )));
    }

    if Enrollment::exists(&state.db, buyer.id, course.id).await? {
        return Err(ApiError::Conflict(
            "You are already enrolled in this course".to_string(),
        ));
    }

    let creator = User::find_by_id(&state.db, course.creator_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course creator not found".to_string()))?;

    let Some(destination_account) = creator.payout_account_id else {
        return Err(ApiError::Conflict(
            "This course is not currently purchasable".to_string(),
        ));
    };

    let split = state.fee_schedule().split(i64::from(course.price_cents));

    let app_url = &state.config.platform.app_url;
    let session = state
        .payments
        .create_checkout_session(&CheckoutSessionRequest {
            product_name: course.title.clone(),
            product_description: course.description.clone(),
            amount_cents: i64::from(course.price_cents),
            application_fee_cents: split.platform_fee_cents,
            destination_account,
            customer_email: buyer.email.clone(),
            success_url: format!("{}/courses/{}?purchase=success", app_url, course.slug),
            cancel_url: format!("{}/courses/{}?purchase=cancelled", app_url, course.slug),
            user_id: buyer.id,
            course_id: course.id,
        })
        .await?;

    tracing::info!(
        user_id = %buyer.id,
        course_id = %course.id,
        session_id = %session.id,
        amount_cents = course.price_cents,
        "Checkout session created"
    );

    Ok(Json(CheckoutResponse { url: session.url }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_request_deserialization() {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{"course_id":"2b7e1556-28ae-4d2a-abf7-158809cf4f3c"}"#,
        )
        .unwrap();
        assert_eq!(
            request.course_id.to_string(),
            "2b7e1556-28ae-4d2a-abf7-158809cf4f3c"
        );
    }

    #[test]
    fn test_checkout_response_shape() {
        let response = CheckoutResponse {
            url: "https://pay.example.com/session/cs_123".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["url"], "https://pay.example.com/session/cs_123");
    }
}
