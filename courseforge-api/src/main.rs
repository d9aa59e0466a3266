//! # Courseforge API Server
//!
//! The HTTP server for the Courseforge course marketplace:
//! - public catalog (published courses, course detail)
//! - creator onboarding (applications, payee account linking)
//! - course/module/lesson authoring with direct-to-provider video uploads
//! - hosted checkout and signed provider webhooks
//! - admin moderation (creator applications, course review, refunds)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p courseforge-api
//! ```

use courseforge_api::{app, config::Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courseforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Courseforge API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = courseforge_shared::db::pool::create_pool(
        courseforge_shared::db::pool::DatabaseConfig {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            ..Default::default()
        },
    )
    .await?;

    courseforge_shared::db::migrations::run_migrations(&pool).await?;

    let state = app::AppState::new(pool, config);
    if !state.payments.is_configured() {
        tracing::warn!("Payment provider credentials missing; checkout, refunds, and payouts will return 503");
    }
    if !state.video.is_configured() {
        tracing::warn!("Video provider credentials missing; lesson video uploads will return 503");
    }

    let bind_address = state.config.bind_address();
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
