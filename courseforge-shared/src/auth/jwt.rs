/// Identity-provider token validation
///
/// The external identity provider authenticates users and issues signed JWTs.
/// This module only *validates* those tokens (signature, expiry, issuer) and
/// extracts the subject plus the mirrored profile fields; no tokens are ever
/// minted here.
///
/// # Example
///
/// ```
/// use courseforge_shared::auth::jwt::{validate_identity_token, IdentityClaims};
///
/// # fn example(token: &str) {
/// match validate_identity_token(token, "shared-signing-secret", "identity.example.com") {
///     Ok(claims) => println!("authenticated subject {}", claims.sub),
///     Err(e) => println!("rejected: {}", e),
/// }
/// # }
/// ```

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Error type for token validation
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by an unexpected party
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// Signature, format, or claim validation failed
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Claims carried by an identity-provider token
///
/// `sub` is the provider's opaque subject id; email/name are profile fields
/// mirrored into the local user row on each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject — opaque external user identifier
    pub sub: String,

    /// Issuer — must match the configured identity provider
    pub iss: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    /// Email address
    pub email: String,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Validates an identity-provider token and returns its claims
///
/// Checks the HMAC signature, expiry, and issuer.
///
/// # Errors
///
/// - [`JwtError::Expired`] if the token is past its `exp`
/// - [`JwtError::InvalidIssuer`] if `iss` does not match
/// - [`JwtError::Invalid`] for signature or format failures
pub fn validate_identity_token(
    token: &str,
    secret: &str,
    expected_issuer: &str,
) -> Result<IdentityClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[expected_issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::Invalid(e.to_string()),
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-signing-secret-at-least-32-bytes!";
    const ISSUER: &str = "identity.test";

    fn make_token(claims: &IdentityClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn valid_claims() -> IdentityClaims {
        let now = chrono::Utc::now().timestamp();
        IdentityClaims {
            sub: "idp_user_1".to_string(),
            iss: ISSUER.to_string(),
            exp: now + 3600,
            iat: now,
            email: "user@example.com".to_string(),
            name: Some("Test User".to_string()),
        }
    }

    #[test]
    fn test_valid_token_round_trip() {
        let token = make_token(&valid_claims(), SECRET);
        let claims = validate_identity_token(&token, SECRET, ISSUER).unwrap();

        assert_eq!(claims.sub, "idp_user_1");
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut claims = valid_claims();
        claims.exp = chrono::Utc::now().timestamp() - 3600;

        let token = make_token(&claims, SECRET);
        let err = validate_identity_token(&token, SECRET, ISSUER).unwrap_err();
        assert!(matches!(err, JwtError::Expired));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let mut claims = valid_claims();
        claims.iss = "someone-else".to_string();

        let token = make_token(&claims, SECRET);
        let err = validate_identity_token(&token, SECRET, ISSUER).unwrap_err();
        assert!(matches!(err, JwtError::InvalidIssuer));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = make_token(&valid_claims(), "another-secret-entirely-32-bytes!!");
        let err = validate_identity_token(&token, SECRET, ISSUER).unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }
}
