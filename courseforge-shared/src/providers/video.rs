/// Video platform client
///
/// The marketplace never touches video bytes: lesson creation requests a
/// direct-upload URL from the video platform, the creator's browser uploads
/// straight to the provider, and the provider reports progress through
/// signed webhooks (`video.upload.asset_created`, `video.asset.ready`).
///
/// This client covers the single outbound capability: minting a direct
/// upload. Like the payment client, missing credentials produce an
/// `Unconfigured` variant at construction time.

use super::payment::ProviderError;
use serde::Deserialize;

/// Configuration for the video client
#[derive(Debug, Clone, Default)]
pub struct VideoConfig {
    /// API token id; `None` leaves the client unconfigured
    pub token_id: Option<String>,

    /// API token secret
    pub token_secret: Option<String>,

    /// Base URL of the provider API
    pub api_base: String,

    /// Origin allowed to perform the browser upload
    pub cors_origin: String,
}

/// A minted direct upload
#[derive(Debug, Clone, Deserialize)]
pub struct DirectUpload {
    /// Opaque upload id; stored as the lesson's pending asset id until the
    /// upload→asset handoff
    pub id: String,

    /// URL the creator's browser uploads to
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct DirectUploadEnvelope {
    data: DirectUpload,
}

/// Video platform client
#[derive(Debug, Clone)]
pub enum VideoClient {
    /// Credentials present
    Configured(ConfiguredVideo),

    /// No credentials; every call fails with `ProviderError::Unconfigured`
    Unconfigured,
}

/// The live client behind [`VideoClient::Configured`]
#[derive(Debug, Clone)]
pub struct ConfiguredVideo {
    http: reqwest::Client,
    token_id: String,
    token_secret: String,
    api_base: String,
    cors_origin: String,
}

impl VideoClient {
    /// Builds a client from configuration
    ///
    /// Both token id and secret are required; otherwise the client is
    /// [`VideoClient::Unconfigured`].
    pub fn from_config(config: &VideoConfig) -> Self {
        match (&config.token_id, &config.token_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                VideoClient::Configured(ConfiguredVideo {
                    http: reqwest::Client::new(),
                    token_id: id.clone(),
                    token_secret: secret.clone(),
                    api_base: config.api_base.trim_end_matches('/').to_string(),
                    cors_origin: config.cors_origin.clone(),
                })
            }
            _ => VideoClient::Unconfigured,
        }
    }

    /// True when credentials are configured
    pub fn is_configured(&self) -> bool {
        matches!(self, VideoClient::Configured(_))
    }

    /// Requests a direct-upload URL for a new lesson video
    pub async fn create_direct_upload(&self) -> Result<DirectUpload, ProviderError> {
        let inner = match self {
            VideoClient::Configured(inner) => inner,
            VideoClient::Unconfigured => return Err(ProviderError::Unconfigured),
        };

        let body = serde_json::json!({
            "cors_origin": inner.cors_origin,
            "new_asset_settings": { "playback_policy": ["public"] },
        });

        let url = format!("{}/video/v1/uploads", inner.api_base);
        let response = inner
            .http
            .post(&url)
            .basic_auth(&inner.token_id, Some(&inner.token_secret))
            .json(&body)
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

        let envelope = response
            .json::<DirectUploadEnvelope>()
            .await
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?;

        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_both_credentials() {
        let base = VideoConfig {
            api_base: "https://api.video.test".to_string(),
            cors_origin: "https://app.courseforge.test".to_string(),
            ..Default::default()
        };

        assert!(!VideoClient::from_config(&base).is_configured());

        let only_id = VideoConfig {
            token_id: Some("token".to_string()),
            ..base.clone()
        };
        assert!(!VideoClient::from_config(&only_id).is_configured());

        let both = VideoConfig {
            token_id: Some("token".to_string()),
            token_secret: Some("secret".to_string()),
            ..base
        };
        assert!(VideoClient::from_config(&both).is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_upload_fails_fast() {
        let err = VideoClient::Unconfigured
            .create_direct_upload()
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unconfigured));
    }
}
