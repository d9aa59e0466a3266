/// Payout batch trigger endpoint
///
/// Invoked by the scheduler (or an operator) with a shared cron secret,
/// not an identity token. The batch aggregates completed, not-yet-paid-out
/// orders per creator over a trailing window and issues one transfer per
/// creator; per-creator failures are isolated and reported in the summary.
///
/// # Endpoint
///
/// - `POST /v1/payouts/run` - Run one payout batch (cron-secret bearer)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::HeaderMap, Json};
use courseforge_shared::payouts::{run_payout_batch, PayoutPolicy, PayoutRunSummary};
use serde::Serialize;

/// Payout run response
#[derive(Debug, Serialize)]
pub struct PayoutRunResponse {
    /// Orders considered in the window
    pub orders_considered: usize,

    /// Transfers successfully issued and recorded
    pub payouts_created: usize,

    /// Creators skipped (no payee account or below threshold)
    pub creators_skipped: usize,

    /// Creators whose transfer failed
    pub transfer_failures: usize,
}

impl From<PayoutRunSummary> for PayoutRunResponse {
    fn from(summary: PayoutRunSummary) -> Self {
        Self {
            orders_considered: summary.orders_considered,
            payouts_created: summary.payouts_created,
            creators_skipped: summary.creators_skipped,
            transfer_failures: summary.transfer_failures,
        }
    }
}

/// Run one payout batch
pub async fn run_payouts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<PayoutRunResponse>> {
    authorize_cron(&state, &headers)?;

    let summary = run_payout_batch(&state.db, &state.payments, &PayoutPolicy::default()).await?;

    Ok(Json(summary.into()))
}

/// Checks the cron-secret bearer token
fn authorize_cron(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    if token != state.config.platform.cron_secret {
        return Err(ApiError::Unauthorized("Invalid cron secret".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_conversion() {
        let summary = PayoutRunSummary {
            orders_considered: 12,
            payouts_created: 3,
            creators_skipped: 1,
            transfer_failures: 1,
        };

        let response: PayoutRunResponse = summary.into();
        assert_eq!(response.orders_considered, 12);
        assert_eq!(response.payouts_created, 3);
        assert_eq!(response.creators_skipped, 1);
        assert_eq!(response.transfer_failures, 1);
    }
}
