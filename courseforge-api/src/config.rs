/// Configuration management for the API server
///
/// This module loads configuration from environment variables once at startup
/// and provides a type-safe configuration struct. Business logic never reads
/// the environment; everything it needs is passed down from here.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST` / `API_PORT`: Bind address (default 0.0.0.0:8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default `*`)
/// - `APP_URL`: Public URL of the learner-facing frontend (required; used
///   for checkout redirects and payee onboarding links)
/// - `IDENTITY_JWT_SECRET`: Identity-provider token signing secret (required)
/// - `IDENTITY_ISSUER`: Expected token issuer (required)
/// - `PLATFORM_FEE_BPS`: Platform fee in basis points (default 1500)
/// - `CRON_SECRET`: Shared secret authorizing `/v1/payouts/run` (required)
/// - `PAYMENT_SECRET_KEY` / `PAYMENT_WEBHOOK_SECRET` / `PAYMENT_API_BASE`:
///   Payment provider credentials (optional; absent = unconfigured)
/// - `VIDEO_TOKEN_ID` / `VIDEO_TOKEN_SECRET` / `VIDEO_WEBHOOK_SECRET` /
///   `VIDEO_API_BASE`: Video provider credentials (optional)

use courseforge_shared::fees::DEFAULT_FEE_BASIS_POINTS;
use courseforge_shared::providers::payment::PaymentConfig;
use courseforge_shared::providers::video::VideoConfig;
use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Identity-provider token validation
    pub auth: AuthConfig,

    /// Marketplace policy knobs
    pub platform: PlatformConfig,

    /// Payment provider credentials
    pub payments: PaymentConfig,

    /// Payment webhook signing secret
    pub payment_webhook_secret: Option<String>,

    /// Video provider credentials
    pub video: VideoConfig,

    /// Video webhook signing secret
    pub video_webhook_secret: Option<String>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` = permissive, development only)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Identity-provider token validation settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing secret shared with the identity provider
    pub jwt_secret: String,

    /// Expected `iss` claim
    pub issuer: String,
}

/// Marketplace policy configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Platform fee in basis points (1500 = 15%)
    pub fee_basis_points: u32,

    /// Public frontend URL for redirects
    pub app_url: String,

    /// Shared secret authorizing batch-payout invocations
    pub cron_secret: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("IDENTITY_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("IDENTITY_JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("IDENTITY_JWT_SECRET must be at least 32 characters long");
        }

        let issuer = env::var("IDENTITY_ISSUER")
            .map_err(|_| anyhow::anyhow!("IDENTITY_ISSUER environment variable is required"))?;

        let fee_basis_points = env::var("PLATFORM_FEE_BPS")
            .unwrap_or_else(|_| DEFAULT_FEE_BASIS_POINTS.to_string())
            .parse::<u32>()?;

        if fee_basis_points > 10_000 {
            anyhow::bail!("PLATFORM_FEE_BPS cannot exceed 10000 (100%)");
        }

        let app_url = env::var("APP_URL")
            .map_err(|_| anyhow::anyhow!("APP_URL environment variable is required"))?
            .trim_end_matches('/')
            .to_string();

        let cron_secret = env::var("CRON_SECRET")
            .map_err(|_| anyhow::anyhow!("CRON_SECRET environment variable is required"))?;

        let payments = PaymentConfig {
            secret_key: env::var("PAYMENT_SECRET_KEY").ok(),
            api_base: env::var("PAYMENT_API_BASE")
                .unwrap_or_else(|_| "https://api.payments.example.com".to_string()),
        };

        let video = VideoConfig {
            token_id: env::var("VIDEO_TOKEN_ID").ok(),
            token_secret: env::var("VIDEO_TOKEN_SECRET").ok(),
            api_base: env::var("VIDEO_API_BASE")
                .unwrap_or_else(|_| "https://api.video.example.com".to_string()),
            cors_origin: app_url.clone(),
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig { jwt_secret, issuer },
            platform: PlatformConfig {
                fee_basis_points,
                app_url,
                cron_secret,
            },
            payments,
            payment_webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET").ok(),
            video,
            video_webhook_secret: env::var("VIDEO_WEBHOOK_SECRET").ok(),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                issuer: "identity.test".to_string(),
            },
            platform: PlatformConfig {
                fee_basis_points: 1500,
                app_url: "https://app.test".to_string(),
                cron_secret: "cron-secret".to_string(),
            },
            payments: PaymentConfig::default(),
            payment_webhook_secret: None,
            video: VideoConfig::default(),
            video_webhook_secret: None,
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(sample_config().bind_address(), "127.0.0.1:8080");
    }
}
