//! Kenyan advisory chat server
//!
//! Serves the agriculture and legal advisory assistants behind an identity
//! gate. Each open conversation runs as its own session state machine.

mod api;
mod app;
mod config;
mod domain;
mod gateway;
mod identity;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use app::{AppController, ControllerConfig};
use config::Config;
use gateway::GatewayRegistry;
use identity::FileIdentityProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advisory_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Ensure data directory exists
    std::fs::create_dir_all(&config.data_dir)?;

    let identity_file = config.identity_file();
    tracing::info!(path = %identity_file.display(), "Opening identity store");
    let identity_provider = Arc::new(FileIdentityProvider::open(identity_file).await);

    let gateways = GatewayRegistry::from_config(&config.backend)?;

    let controller = AppController::initialize(
        identity_provider,
        gateways,
        ControllerConfig {
            identity_provider_url: config.identity_provider_url.clone(),
            gateway_timeout: config.gateway_timeout,
        },
    )
    .await;

    tracing::info!(
        identity_provider = %config.identity_provider_url,
        gateway_timeout_secs = config.gateway_timeout.as_secs(),
        logged_in = controller.state().is_logged_in(),
        "Application controller initialized"
    );

    let state = AppState::new(controller);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Advisory chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
