/// Payment provider client
///
/// Thin client over the payment processor's REST API, covering exactly the
/// capabilities the marketplace consumes:
///
/// - hosted checkout sessions (with destination account + application fee)
/// - refunds against a payment reference
/// - payee account creation and onboarding links (creator "connect" flow)
/// - transfers to payee accounts (payout batch)
///
/// Constructed once at startup from configuration. When no secret key is
/// configured the constructor yields the `Unconfigured` variant and every
/// call fails with [`ProviderError::Unconfigured`] — handlers surface that as
/// a 503 rather than sprinkling null checks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for provider calls
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No credentials were configured for this provider
    #[error("Payment provider is not configured")]
    Unconfigured,

    /// Transport-level failure
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider response did not have the expected shape
    #[error("Unexpected provider response: {0}")]
    UnexpectedResponse(String),
}

/// Configuration for the payment client
#[derive(Debug, Clone, Default)]
pub struct PaymentConfig {
    /// API secret key; `None` leaves the client unconfigured
    pub secret_key: Option<String>,

    /// Base URL of the provider API
    pub api_base: String,
}

/// Input for creating a hosted checkout session
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    /// Course title shown on the hosted page
    pub product_name: String,

    /// Short description shown on the hosted page
    pub product_description: String,

    /// Gross charge in cents
    pub amount_cents: i64,

    /// Platform share, collected as an application fee
    pub application_fee_cents: i64,

    /// Creator's payee account receiving the remainder
    pub destination_account: String,

    /// Buyer email for the receipt
    pub customer_email: String,

    /// Redirect after successful payment
    pub success_url: String,

    /// Redirect after cancellation
    pub cancel_url: String,

    /// Correlation metadata echoed back on the completion webhook
    pub user_id: Uuid,
    pub course_id: Uuid,
}

/// A created checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Opaque session id (persisted on the order for idempotency)
    pub id: String,

    /// Hosted payment page URL
    pub url: String,
}

/// A created payee account
#[derive(Debug, Clone, Deserialize)]
pub struct PayeeAccount {
    /// Opaque account id (persisted on the user)
    pub id: String,
}

/// An onboarding link for a payee account
#[derive(Debug, Clone, Deserialize)]
pub struct AccountLink {
    /// Hosted onboarding URL
    pub url: String,
}

/// A created transfer
#[derive(Debug, Clone, Deserialize)]
pub struct Transfer {
    /// Opaque transfer id (persisted on the payout)
    pub id: String,
}

/// A created refund
#[derive(Debug, Clone, Deserialize)]
pub struct Refund {
    /// Opaque refund id
    pub id: String,
}

#[derive(Debug, Serialize)]
struct SessionMetadata {
    user_id: Uuid,
    course_id: Uuid,
}

/// Payment provider client
#[derive(Debug, Clone)]
pub enum PaymentClient {
    /// Credentials present; calls go out over HTTPS
    Configured(ConfiguredPayments),

    /// No credentials; every call fails with `ProviderError::Unconfigured`
    Unconfigured,
}

/// The live client behind [`PaymentClient::Configured`]
#[derive(Debug, Clone)]
pub struct ConfiguredPayments {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl PaymentClient {
    /// Builds a client from configuration
    ///
    /// A missing secret key yields [`PaymentClient::Unconfigured`].
    pub fn from_config(config: &PaymentConfig) -> Self {
        match &config.secret_key {
            Some(secret_key) if !secret_key.is_empty() => {
                PaymentClient::Configured(ConfiguredPayments {
                    http: reqwest::Client::new(),
                    secret_key: secret_key.clone(),
                    api_base: config.api_base.trim_end_matches('/').to_string(),
                })
            }
            _ => PaymentClient::Unconfigured,
        }
    }

    /// True when credentials are configured
    pub fn is_configured(&self) -> bool {
        matches!(self, PaymentClient::Configured(_))
    }

    fn inner(&self) -> Result<&ConfiguredPayments, ProviderError> {
        match self {
            PaymentClient::Configured(inner) => Ok(inner),
            PaymentClient::Unconfigured => Err(ProviderError::Unconfigured),
        }
    }

    /// Creates a hosted checkout session
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        let inner = self.inner()?;

        let body = serde_json::json!({
            "mode": "payment",
            "line_items": [{
                "quantity": 1,
                "price_data": {
                    "currency": "usd",
                    "unit_amount": request.amount_cents,
                    "product_data": {
                        "name": request.product_name,
                        "description": request.product_description,
                    },
                },
            }],
            "payment_intent_data": {
                "application_fee_amount": request.application_fee_cents,
                "transfer_data": { "destination": request.destination_account },
            },
            "customer_email": request.customer_email,
            "success_url": request.success_url,
            "cancel_url": request.cancel_url,
            "metadata": SessionMetadata {
                user_id: request.user_id,
                course_id: request.course_id,
            },
        });

        inner.post_json("/v1/checkout/sessions", &body).await
    }

    /// Issues a refund against a payment reference
    pub async fn create_refund(
        &self,
        payment_intent_id: &str,
        amount_cents: i64,
    ) -> Result<Refund, ProviderError> {
        let inner = self.inner()?;

        let body = serde_json::json!({
            "payment_intent": payment_intent_id,
            "amount": amount_cents,
        });

        inner.post_json("/v1/refunds", &body).await
    }

    /// Creates a payee account for a creator
    pub async fn create_payee_account(&self, email: &str) -> Result<PayeeAccount, ProviderError> {
        let inner = self.inner()?;

        let body = serde_json::json!({
            "type": "express",
            "email": email,
            "capabilities": {
                "card_payments": { "requested": true },
                "transfers": { "requested": true },
            },
        });

        inner.post_json("/v1/accounts", &body).await
    }

    /// Creates an onboarding link for a payee account
    pub async fn create_account_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<AccountLink, ProviderError> {
        let inner = self.inner()?;

        let body = serde_json::json!({
            "account": account_id,
            "refresh_url": refresh_url,
            "return_url": return_url,
            "type": "account_onboarding",
        });

        inner.post_json("/v1/account_links", &body).await
    }

    /// Creates a transfer to a payee account
    pub async fn create_transfer(
        &self,
        destination_account: &str,
        amount_cents: i64,
    ) -> Result<Transfer, ProviderError> {
        let inner = self.inner()?;

        let body = serde_json::json!({
            "amount": amount_cents,
            "currency": "usd",
            "destination": destination_account,
        });

        inner.post_json("/v1/transfers", &body).await
    }
}

impl ConfiguredPayments {
    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.api_base, path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_yields_unconfigured() {
        let client = PaymentClient::from_config(&PaymentConfig {
            secret_key: None,
            api_base: "https://api.payments.test".to_string(),
        });
        assert!(!client.is_configured());

        let client = PaymentClient::from_config(&PaymentConfig {
            secret_key: Some(String::new()),
            api_base: "https://api.payments.test".to_string(),
        });
        assert!(!client.is_configured());
    }

    #[test]
    fn test_configured_client() {
        let client = PaymentClient::from_config(&PaymentConfig {
            secret_key: Some("sk_test_123".to_string()),
            api_base: "https://api.payments.test/".to_string(),
        });
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_calls_fail_fast() {
        let client = PaymentClient::Unconfigured;
        let err = client.create_refund("pi_123", 500).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unconfigured));

        let err = client.create_transfer("acct_123", 500).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unconfigured));
    }
}
