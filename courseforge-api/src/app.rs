/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use courseforge_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = courseforge_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use courseforge_shared::auth::context::AuthContext;
use courseforge_shared::auth::jwt;
use courseforge_shared::fees::FeeSchedule;
use courseforge_shared::models::user::{IdentityProfile, User};
use courseforge_shared::providers::payment::PaymentClient;
use courseforge_shared::providers::video::VideoClient;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Payment provider client
    pub payments: Arc<PaymentClient>,

    /// Video platform client
    pub video: Arc<VideoClient>,
}

impl AppState {
    /// Creates new application state, constructing provider clients from
    /// configuration
    pub fn new(db: PgPool, config: Config) -> Self {
        let payments = PaymentClient::from_config(&config.payments);
        let video = VideoClient::from_config(&config.video);

        Self {
            db,
            config: Arc::new(config),
            payments: Arc::new(payments),
            video: Arc::new(video),
        }
    }

    /// Fee schedule derived from configuration
    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::new(self.config.platform.fee_basis_points)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /v1/
/// │   ├── GET  /courses              # Published catalog (public)
/// │   ├── GET  /courses/:id          # Course detail (public)
/// │   ├── POST /webhooks/payments    # Payment provider webhooks (signed)
/// │   ├── POST /webhooks/video       # Video provider webhooks (signed)
/// │   ├── POST /payouts/run          # Payout batch (cron-secret bearer)
/// │   └── ...                        # Authenticated routes (identity JWT)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route-group basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public catalog + webhook + cron routes (no identity auth; webhooks are
    // signature-verified, the payout trigger is cron-secret authorized)
    let public_routes = Router::new()
        .route("/courses", get(routes::courses::list_courses))
        .route("/courses/:id", get(routes::courses::get_course))
        .route("/webhooks/payments", post(routes::webhooks::payment_webhook))
        .route("/webhooks/video", post(routes::webhooks::video_webhook))
        .route("/payouts/run", post(routes::payouts::run_payouts));

    // Authenticated routes (identity JWT required)
    let authed_routes = Router::new()
        .route("/me/enrollments", get(routes::me::list_enrollments))
        .route("/me/orders", get(routes::me::list_orders))
        .route("/creator/apply", post(routes::creator::apply))
        .route("/creator/connect-link", post(routes::creator::connect_link))
        .route("/creator/courses", get(routes::creator::list_my_courses))
        .route("/creator/payouts", get(routes::creator::list_payouts))
        .route("/courses", post(routes::courses::create_course))
        .route("/courses/:id", patch(routes::courses::update_course))
        .route("/courses/:id/submit", post(routes::courses::submit_course))
        .route("/courses/:id/modules", post(routes::modules::create_module))
        .route("/modules/:id", patch(routes::modules::update_module))
        .route("/lessons", post(routes::lessons::create_lesson))
        .route("/lessons/:id", patch(routes::lessons::update_lesson))
        .route("/checkout", post(routes::checkout::create_checkout))
        .route("/reviews", post(routes::reviews::create_review))
        .route("/admin/applications", get(routes::admin::list_applications))
        .route("/admin/courses", get(routes::admin::list_submitted_courses))
        .route("/admin/approve-creator", post(routes::admin::approve_creator))
        .route("/admin/approve-course", post(routes::admin::approve_course))
        .route("/admin/refund", post(routes::admin::refund))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            identity_auth_layer,
        ));

    let v1_routes = Router::new().merge(public_routes).merge(authed_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Identity authentication middleware layer
///
/// Validates the identity-provider JWT from the Authorization header,
/// upserts the local user row from the token's profile claims, and injects
/// an [`AuthContext`] into request extensions.
async fn identity_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_identity_token(
        token,
        &state.config.auth.jwt_secret,
        &state.config.auth.issuer,
    )?;

    // First sight of a subject creates the user; later requests refresh the
    // mirrored profile fields.
    let user = User::upsert_from_identity(
        &state.db,
        &IdentityProfile {
            identity_id: claims.sub,
            email: claims.email,
            name: claims.name,
        },
    )
    .await?;

    req.extensions_mut().insert(AuthContext::new(user));

    Ok(next.run(req).await)
}
