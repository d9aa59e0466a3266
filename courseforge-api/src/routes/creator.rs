/// Creator onboarding endpoints
///
/// A learner applies once to become a creator; an admin reviews the
/// application through the moderation routes. Approved creators link a
/// payment-provider payee account (required before their courses can be
/// sold) and can list their own courses regardless of status.
///
/// # Endpoints
///
/// - `POST /v1/creator/apply` - Submit a creator application (learner)
/// - `POST /v1/creator/connect-link` - Create payee account + onboarding URL
/// - `GET  /v1/creator/courses` - List the caller's courses (any status)
/// - `GET  /v1/creator/payouts` - The caller's payout history

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use courseforge_shared::{
    auth::context::AuthContext,
    models::{
        course::Course,
        creator_application::{CreateApplication, CreatorApplication},
        payout::Payout,
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Creator application request
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    /// Applicant biography
    #[validate(length(min = 1, max = 5000, message = "Bio must be 1-5000 characters"))]
    pub bio: String,

    /// Why the applicant wants to teach
    #[validate(length(min = 1, max = 5000, message = "Reason must be 1-5000 characters"))]
    pub reason: String,

    /// Optional social/profile links
    pub social_links: Option<serde_json::Value>,
}

/// Connect-link response
#[derive(Debug, Serialize)]
pub struct ConnectLinkResponse {
    /// Hosted payee onboarding URL
    pub url: String,
}

/// Creator course list response
#[derive(Debug, Serialize)]
pub struct MyCoursesResponse {
    /// The caller's courses, newest first
    pub courses: Vec<Course>,
}

/// Payout history response
#[derive(Debug, Serialize)]
pub struct PayoutsResponse {
    /// Payouts, newest first
    pub payouts: Vec<Payout>,

    /// Lifetime total in cents
    pub total_cents: i64,
}

/// Submit a creator application (learner only, once)
pub async fn apply(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<Json<CreatorApplication>> {
    let user = auth.require_learner()?;
    request.validate()?;

    if CreatorApplication::find_by_user(&state.db, user.id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "You have already submitted a creator application".to_string(),
        ));
    }

    let application = CreatorApplication::create(
        &state.db,
        CreateApplication {
            user_id: user.id,
            bio: request.bio,
            reason: request.reason,
            social_links: request.social_links,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, application_id = %application.id, "Creator application submitted");

    Ok(Json(application))
}

/// Create (or reuse) a payee account and return an onboarding link
///
/// The provider account is created on first call and stored on the user;
/// later calls reuse it and just mint a fresh onboarding link, so an
/// interrupted onboarding can be resumed.
pub async fn connect_link(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ConnectLinkResponse>> {
    let creator = auth.require_creator()?;

    let account_id = match &creator.payout_account_id {
        Some(id) => id.clone(),
        None => {
            let account = state.payments.create_payee_account(&creator.email).await?;
            User::set_payout_account(&state.db, creator.id, &account.id).await?;

            tracing::info!(user_id = %creator.id, account_id = %account.id, "Payee account created");
            account.id
        }
    };

    let app_url = &state.config.platform.app_url;
    let link = state
        .payments
        .create_account_link(
            &account_id,
            &format!("{}/creator/connect", app_url),
            &format!("{}/creator/dashboard", app_url),
        )
        .await?;

    Ok(Json(ConnectLinkResponse { url: link.url }))
}

/// List the caller's own courses in every status (approved creator)
pub async fn list_my_courses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MyCoursesResponse>> {
    let creator = auth.require_creator()?;

    let courses = Course::list_by_creator(&state.db, creator.id).await?;

    Ok(Json(MyCoursesResponse { courses }))
}

/// List the caller's payout history (approved creator)
pub async fn list_payouts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PayoutsResponse>> {
    let creator = auth.require_creator()?;

    let payouts = Payout::list_by_creator(&state.db, creator.id).await?;
    let total_cents = Payout::total_for_creator(&state.db, creator.id).await?;

    Ok(Json(PayoutsResponse {
        payouts,
        total_cents,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_request_validation() {
        let valid = ApplyRequest {
            bio: "I teach systems programming.".to_string(),
            reason: "I want to publish my Rust curriculum.".to_string(),
            social_links: None,
        };
        assert!(valid.validate().is_ok());

        let empty_bio = ApplyRequest {
            bio: String::new(),
            reason: "Teaching.".to_string(),
            social_links: None,
        };
        assert!(empty_bio.validate().is_err());
    }

    #[test]
    fn test_apply_request_accepts_social_links() {
        let request: ApplyRequest = serde_json::from_str(
            r#"{"bio":"b","reason":"r","social_links":{"website":"https://example.com"}}"#,
        )
        .unwrap();
        assert!(request.social_links.is_some());
    }
}
