mod auth;
mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod profile;
mod proposal;
mod routes;
mod state;
mod upload;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{HttpIdentityVerifier, RejectAllVerifier, TokenVerifier};
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::LlmGateway;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("bidforge_api={}", &config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting BidForge API v{}", env!("CARGO_PKG_VERSION"));

    errors::set_debug_errors(config.debug_errors);
    if config.debug_errors {
        warn!("DEBUG_ERRORS enabled: responses carry internal error detail");
    }

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Initialize the token verifier
    let verifier: Arc<dyn TokenVerifier> = match &config.identity_verify_url {
        Some(url) => {
            info!("Identity verifier initialized ({url})");
            Arc::new(HttpIdentityVerifier::new(
                url.clone(),
                config.identity_api_key.clone(),
            ))
        }
        None => Arc::new(RejectAllVerifier),
    };
    if config.dev_auth_enabled {
        warn!("DEV_AUTH_ENABLED: requests are trusted from x-dev-* headers");
    }

    // Initialize the LLM gateway
    let gateway = LlmGateway::new(config.llm.clone());
    let shapes = gateway.configured_shapes();
    if shapes.is_empty() {
        warn!("No LLM calling convention configured; extraction falls back to heuristics");
    } else {
        info!(
            "LLM gateway initialized (model: {}, shapes: {})",
            config.llm.model,
            shapes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        );
    }

    // Build app state
    let state = AppState {
        db,
        gateway,
        verifier,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
