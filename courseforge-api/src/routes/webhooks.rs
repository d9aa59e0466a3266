/// Signed provider webhook ingestion
///
/// Both providers deliver events at least once, signed with an HMAC-SHA256
/// header over the raw request body. Verification happens against the raw
/// bytes before any JSON parsing; a missing or invalid signature rejects
/// the delivery with a 400 and no side effects. Event types the
/// marketplace does not consume are acknowledged and ignored so the
/// provider stops retrying them.
///
/// # Endpoints
///
/// - `POST /v1/webhooks/payments` - Payment provider events
///   - `checkout.session.completed` → order + enrollment fulfillment
/// - `POST /v1/webhooks/video` - Video platform events
///   - `video.upload.asset_created` → upload id rewritten to asset id
///   - `video.asset.ready` → playback id + duration stamped

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use courseforge_shared::{
    fulfillment::{fulfill_checkout, PaidCheckout},
    models::lesson::Lesson,
    providers::signature::{verify_signature, DEFAULT_TOLERANCE_SECONDS},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Signature header used by both providers
const SIGNATURE_HEADER: &str = "webhook-signature";

/// Payment provider event envelope
#[derive(Debug, Deserialize)]
struct PaymentEvent {
    #[serde(rename = "type")]
    event_type: String,

    data: PaymentEventData,
}

#[derive(Debug, Deserialize)]
struct PaymentEventData {
    object: CheckoutSessionObject,
}

/// The checkout session carried by `checkout.session.completed`
#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    id: String,

    #[serde(default)]
    mode: Option<String>,

    #[serde(default)]
    payment_status: Option<String>,

    #[serde(default)]
    amount_total: Option<i64>,

    #[serde(default)]
    payment_intent: Option<String>,

    #[serde(default)]
    metadata: SessionMetadata,
}

/// Correlation metadata echoed back from session creation
#[derive(Debug, Default, Deserialize)]
struct SessionMetadata {
    #[serde(default)]
    user_id: Option<Uuid>,

    #[serde(default)]
    course_id: Option<Uuid>,
}

/// Video provider event envelope
#[derive(Debug, Deserialize)]
struct VideoEvent {
    #[serde(rename = "type")]
    event_type: String,

    data: VideoEventData,
}

#[derive(Debug, Deserialize)]
struct VideoEventData {
    /// Asset id on `video.asset.ready`; upload id on
    /// `video.upload.asset_created`
    id: String,

    #[serde(default)]
    asset_id: Option<String>,

    #[serde(default)]
    playback_ids: Vec<PlaybackId>,

    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PlaybackId {
    id: String,
}

/// Verifies the signature header against the raw body
fn verify(secret: Option<&str>, headers: &HeaderMap, body: &[u8]) -> ApiResult<()> {
    let secret = secret.ok_or_else(|| {
        ApiError::ServiceUnavailable("Webhook ingestion is not configured".to_string())
    })?;

    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing webhook signature".to_string()))?;

    verify_signature(
        secret,
        header,
        body,
        chrono::Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECONDS,
    )?;

    Ok(())
}

/// Ingest a payment provider event
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    verify(state.config.payment_webhook_secret.as_deref(), &headers, &body)?;

    let event: PaymentEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {}", e)))?;

    if event.event_type != "checkout.session.completed" {
        tracing::debug!(event_type = %event.event_type, "Ignoring payment event");
        return Ok(Json(json!({ "received": true })));
    }

    let session = event.data.object;

    // Only one-time payment sessions are ours; and asynchronous payment
    // methods deliver the completion event before the funds clear, so only
    // a paid session grants access.
    if session.mode.as_deref() != Some("payment")
        || session.payment_status.as_deref() != Some("paid")
    {
        tracing::info!(
            session_id = %session.id,
            mode = ?session.mode,
            payment_status = ?session.payment_status,
            "Checkout session completed but not a paid one-time payment, ignoring"
        );
        return Ok(Json(json!({ "received": true })));
    }

    let (Some(user_id), Some(course_id)) = (session.metadata.user_id, session.metadata.course_id)
    else {
        return Err(ApiError::BadRequest(
            "Checkout session missing correlation metadata".to_string(),
        ));
    };

    let amount_cents = session.amount_total.ok_or_else(|| {
        ApiError::BadRequest("Checkout session missing amount".to_string())
    })?;

    let outcome = fulfill_checkout(
        &state.db,
        &state.fee_schedule(),
        PaidCheckout {
            user_id,
            course_id,
            amount_cents,
            payment_intent_id: session.payment_intent,
            session_id: session.id,
        },
    )
    .await?;

    tracing::debug!(?outcome, "Payment webhook processed");

    Ok(Json(json!({ "received": true })))
}

/// Ingest a video platform event
pub async fn video_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    verify(state.config.video_webhook_secret.as_deref(), &headers, &body)?;

    let event: VideoEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {}", e)))?;

    match event.event_type.as_str() {
        // Upload finished; the provider minted the real asset. Rewrite the
        // lesson's pending upload id to the asset id so the ready event can
        // find it.
        "video.upload.asset_created" => {
            let Some(asset_id) = event.data.asset_id else {
                return Err(ApiError::BadRequest(
                    "Upload event missing asset id".to_string(),
                ));
            };

            match Lesson::find_by_video_asset(&state.db, &event.data.id).await? {
                Some(lesson) => {
                    Lesson::reassign_video_asset(&state.db, lesson.id, &asset_id).await?;
                    tracing::info!(
                        lesson_id = %lesson.id,
                        upload_id = %event.data.id,
                        asset_id = %asset_id,
                        "Lesson video asset assigned"
                    );
                }
                // Upload for a deleted lesson or foreign environment; the
                // event is acknowledged so the provider stops retrying.
                None => {
                    tracing::warn!(upload_id = %event.data.id, "Upload event for unknown lesson, ignoring");
                }
            }
        }

        // Asset is playable; stamp the playback id and rounded duration.
        "video.asset.ready" => {
            match Lesson::find_by_video_asset(&state.db, &event.data.id).await? {
                Some(lesson) => {
                    let playback_id = event
                        .data
                        .playback_ids
                        .first()
                        .map(|p| p.id.as_str())
                        .ok_or_else(|| {
                            ApiError::BadRequest("Ready event missing playback id".to_string())
                        })?;

                    let duration_seconds = event.data.duration.map(|d| d.round() as i32);

                    Lesson::mark_video_ready(&state.db, lesson.id, playback_id, duration_seconds)
                        .await?;

                    tracing::info!(
                        lesson_id = %lesson.id,
                        asset_id = %event.data.id,
                        playback_id = %playback_id,
                        duration_seconds = ?duration_seconds,
                        "Lesson video ready"
                    );
                }
                None => {
                    tracing::warn!(asset_id = %event.data.id, "Ready event for unknown lesson, ignoring");
                }
            }
        }

        other => {
            tracing::debug!(event_type = %other, "Ignoring video event");
        }
    }

    Ok(Json(json!({ "received": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_event_parsing() {
        let payload = r#"{
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "mode": "payment",
                    "payment_status": "paid",
                    "amount_total": 4900,
                    "payment_intent": "pi_test_456",
                    "metadata": {
                        "user_id": "2b7e1556-28ae-4d2a-abf7-158809cf4f3c",
                        "course_id": "3f2504e0-4f89-41d3-9a0c-0305e82c3301"
                    }
                }
            }
        }"#;

        let event: PaymentEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.data.object.id, "cs_test_123");
        assert_eq!(event.data.object.amount_total, Some(4_900));
        assert!(event.data.object.metadata.user_id.is_some());
    }

    #[test]
    fn test_payment_event_missing_metadata_parses() {
        // Metadata absence is a handler-level 400, not a parse failure
        let payload = r#"{
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_test_123" } }
        }"#;

        let event: PaymentEvent = serde_json::from_str(payload).unwrap();
        assert!(event.data.object.metadata.user_id.is_none());
        assert!(event.data.object.payment_status.is_none());
    }

    #[test]
    fn test_video_ready_event_parsing() {
        let payload = r#"{
            "type": "video.asset.ready",
            "data": {
                "id": "asset_123",
                "playback_ids": [{ "id": "playback_456" }],
                "duration": 182.654
            }
        }"#;

        let event: VideoEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.event_type, "video.asset.ready");
        assert_eq!(event.data.playback_ids[0].id, "playback_456");
        // Duration is rounded to whole seconds when stored
        assert_eq!(event.data.duration.map(|d| d.round() as i32), Some(183));
    }

    #[test]
    fn test_video_upload_event_parsing() {
        let payload = r#"{
            "type": "video.upload.asset_created",
            "data": { "id": "upload_123", "asset_id": "asset_456" }
        }"#;

        let event: VideoEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.data.id, "upload_123");
        assert_eq!(event.data.asset_id.as_deref(), Some("asset_456"));
        assert!(event.data.playback_ids.is_empty());
    }
}
