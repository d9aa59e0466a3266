/// Health check endpoint
///
/// Answers `GET /health` with the service name and version plus a live
/// database probe. Load balancers treat any 200 as routable; the `status`
/// field distinguishes a fully healthy instance from one that lost its
/// database.
///
/// # Response
///
/// ```json
/// {
///   "service": "courseforge-api",
///   "version": "0.1.0",
///   "status": "healthy",
///   "database": "connected"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service name
    pub service: String,

    /// Application version
    pub version: String,

    /// `healthy` or `degraded`
    pub status: String,

    /// `connected` or `disconnected`
    pub database: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_up = sqlx::query("SELECT 1").fetch_one(&state.db).await.is_ok();
    let (status, database) = if database_up {
        ("healthy", "connected")
    } else {
        ("degraded", "disconnected")
    };

    Ok(Json(HealthResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: status.to_string(),
        database: database.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let response = HealthResponse {
            service: "courseforge-api".to_string(),
            version: "0.1.0".to_string(),
            status: "healthy".to_string(),
            database: "connected".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["service"], "courseforge-api");
        assert_eq!(json["status"], "healthy");
    }
}
