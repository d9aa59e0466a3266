/// Webhook signature verification
///
/// Both providers sign webhook deliveries with the same scheme: a header of
/// the form
///
/// ```text
/// t=1714857600,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
/// ```
///
/// where `v1` is the hex HMAC-SHA256 of `"{t}.{raw body}"` under the
/// endpoint's webhook secret. Verification recomputes the HMAC over the raw
/// request body and checks the timestamp against a freshness tolerance to
/// limit replay.
///
/// An invalid or missing signature must reject the delivery outright with no
/// side effects.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default freshness tolerance: 5 minutes
pub const DEFAULT_TOLERANCE_SECONDS: i64 = 300;

/// Error type for signature verification
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Header absent or not parseable as `t=..,v1=..`
    #[error("Malformed signature header")]
    Malformed,

    /// Timestamp outside the freshness tolerance
    #[error("Signature timestamp outside tolerance")]
    Stale,

    /// HMAC mismatch
    #[error("Signature mismatch")]
    Mismatch,
}

/// Parsed signature header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSignature {
    /// Unix timestamp the provider signed at
    pub timestamp: i64,

    /// Hex-encoded HMAC-SHA256
    pub signature: String,
}

impl WebhookSignature {
    /// Parses a `t=..,v1=..` header value
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signature = None;

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| SignatureError::Malformed)?);
                }
                Some(("v1", value)) => {
                    signature = Some(value.to_string());
                }
                // Unknown scheme versions are ignored, per provider docs
                Some(_) => {}
                None => return Err(SignatureError::Malformed),
            }
        }

        match (timestamp, signature) {
            (Some(timestamp), Some(signature)) => Ok(Self { timestamp, signature }),
            _ => Err(SignatureError::Malformed),
        }
    }
}

/// Computes the expected hex signature for a payload
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");

    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a webhook delivery
///
/// `now` is passed in (rather than read ambiently) so the tolerance check is
/// deterministic under test.
///
/// # Errors
///
/// - [`SignatureError::Malformed`] if the header cannot be parsed
/// - [`SignatureError::Stale`] if the timestamp is outside `tolerance_seconds`
/// - [`SignatureError::Mismatch`] if the HMAC does not match
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
    now: i64,
    tolerance_seconds: i64,
) -> Result<(), SignatureError> {
    let parsed = WebhookSignature::parse(header)?;

    if (now - parsed.timestamp).abs() > tolerance_seconds {
        return Err(SignatureError::Stale);
    }

    // Constant-time comparison via the Mac verify API
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(parsed.timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let provided = hex::decode(&parsed.signature).map_err(|_| SignatureError::Mismatch)?;
    mac.verify_slice(&provided).map_err(|_| SignatureError::Mismatch)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    fn signed_header(timestamp: i64) -> String {
        format!("t={},v1={}", timestamp, sign_payload(SECRET, timestamp, PAYLOAD))
    }

    #[test]
    fn test_parse_header() {
        let sig = WebhookSignature::parse("t=1714857600,v1=abc123").unwrap();
        assert_eq!(sig.timestamp, 1714857600);
        assert_eq!(sig.signature, "abc123");
    }

    #[test]
    fn test_parse_ignores_unknown_versions() {
        let sig = WebhookSignature::parse("t=10,v0=old,v1=abc").unwrap();
        assert_eq!(sig.signature, "abc");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(WebhookSignature::parse("nonsense").unwrap_err(), SignatureError::Malformed);
        assert_eq!(WebhookSignature::parse("t=abc,v1=x").unwrap_err(), SignatureError::Malformed);
        assert_eq!(WebhookSignature::parse("v1=onlysig").unwrap_err(), SignatureError::Malformed);
    }

    #[test]
    fn test_valid_signature_accepted() {
        let now = 1714857600;
        let header = signed_header(now);
        assert!(verify_signature(SECRET, &header, PAYLOAD, now, DEFAULT_TOLERANCE_SECONDS).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = 1714857600;
        let header = signed_header(now);
        let err =
            verify_signature(SECRET, &header, b"{\"tampered\":true}", now, DEFAULT_TOLERANCE_SECONDS)
                .unwrap_err();
        assert_eq!(err, SignatureError::Mismatch);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = 1714857600;
        let header = signed_header(now);
        let err = verify_signature("whsec_other", &header, PAYLOAD, now, DEFAULT_TOLERANCE_SECONDS)
            .unwrap_err();
        assert_eq!(err, SignatureError::Mismatch);
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let signed_at = 1714857600;
        let header = signed_header(signed_at);
        let err = verify_signature(
            SECRET,
            &header,
            PAYLOAD,
            signed_at + DEFAULT_TOLERANCE_SECONDS + 1,
            DEFAULT_TOLERANCE_SECONDS,
        )
        .unwrap_err();
        assert_eq!(err, SignatureError::Stale);
    }
}
