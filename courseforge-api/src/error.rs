/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which automatically converts
/// to an appropriate HTTP status code with a stable `{error, message}` JSON
/// body.
///
/// # Example
///
/// ```ignore
/// use courseforge_api::error::ApiResult;
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     let data = fetch_data().await?;
///     Ok(Json(json!({ "data": data })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courseforge_shared::auth::context::AccessError;
use courseforge_shared::auth::jwt::JwtError;
use courseforge_shared::fulfillment::FulfillmentError;
use courseforge_shared::moderation::ModerationError;
use courseforge_shared::providers::payment::ProviderError;
use courseforge_shared::providers::signature::SignatureError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate review, already-refunded order
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503) - e.g., provider not configured
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique-constraint violations surface as conflicts
                if let Some(constraint) = db_err.constraint() {
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert token-validation errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            JwtError::Invalid(msg) => ApiError::Unauthorized(format!("Invalid token: {}", msg)),
        }
    }
}

/// Convert role-guard errors to API errors
impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden(msg) => ApiError::Forbidden(msg.to_string()),
        }
    }
}

/// Convert provider errors to API errors
impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unconfigured => {
                ApiError::ServiceUnavailable("Payment processing is not configured".to_string())
            }
            ProviderError::Request(e) => {
                ApiError::InternalError(format!("Provider request failed: {}", e))
            }
            ProviderError::Api { status, message } => {
                ApiError::InternalError(format!("Provider returned {}: {}", status, message))
            }
            ProviderError::UnexpectedResponse(msg) => {
                ApiError::InternalError(format!("Unexpected provider response: {}", msg))
            }
        }
    }
}

/// Convert fulfillment/refund errors to API errors
impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        match err {
            FulfillmentError::CourseNotFound(id) => {
                ApiError::NotFound(format!("Course {} not found", id))
            }
            FulfillmentError::OrderNotFound(id) => {
                ApiError::NotFound(format!("Order {} not found", id))
            }
            FulfillmentError::AlreadyRefunded(id) => {
                ApiError::Conflict(format!("Order {} is already refunded", id))
            }
            FulfillmentError::InvalidAmount(cents) => {
                ApiError::BadRequest(format!("Invalid charge amount: {} cents", cents))
            }
            FulfillmentError::Provider(e) => e.into(),
            FulfillmentError::Database(e) => e.into(),
        }
    }
}

/// Convert moderation errors to API errors
impl From<ModerationError> for ApiError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::CourseNotFound(id) => {
                ApiError::NotFound(format!("Course {} not found", id))
            }
            ModerationError::ApplicationNotFound(user_id) => {
                ApiError::NotFound(format!("No creator application for user {}", user_id))
            }
            ModerationError::AlreadyReviewed(user_id) => {
                ApiError::Conflict(format!("Application for user {} already reviewed", user_id))
            }
            ModerationError::NotOwner(_) => {
                ApiError::Forbidden("You do not own this course".to_string())
            }
            ModerationError::InvalidTransition { current, requested } => ApiError::Conflict(
                format!("Course is {}, cannot transition to {}", current, requested),
            ),
            ModerationError::Database(e) => e.into(),
        }
    }
}

/// Convert webhook signature errors to API errors
///
/// All signature failures are 400s: the delivery is rejected with no
/// processing and no detail about which check failed beyond the variant.
impl From<SignatureError> for ApiError {
    fn from(err: SignatureError) -> Self {
        ApiError::BadRequest(format!("Webhook signature rejected: {}", err))
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Course not found".to_string());
        assert_eq!(err.to_string(), "Not found: Course not found");
    }

    #[test]
    fn test_unconfigured_provider_maps_to_service_unavailable() {
        let err: ApiError = ProviderError::Unconfigured.into();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_signature_failure_maps_to_bad_request() {
        let err: ApiError = SignatureError::Mismatch.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_already_refunded_maps_to_conflict() {
        let err: ApiError = FulfillmentError::AlreadyRefunded(uuid::Uuid::nil()).into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_validation_error_detail_count() {
        let errors = vec![
            ValidationErrorDetail {
                field: "title".to_string(),
                message: "Title is required".to_string(),
            },
            ValidationErrorDetail {
                field: "price_cents".to_string(),
                message: "Price cannot be negative".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
