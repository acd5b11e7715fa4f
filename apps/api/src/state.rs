use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::llm_client::LlmGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub gateway: LlmGateway,
    /// Pluggable token verifier. HTTP-backed when an identity service is
    /// configured, reject-all otherwise.
    pub verifier: Arc<dyn TokenVerifier>,
    pub config: Config,
}
