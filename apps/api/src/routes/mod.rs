pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::extraction::handlers as extraction_handlers;
use crate::profile::handlers as profile_handlers;
use crate::proposal::handlers as proposal_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Parsing surfaces (public)
        .route("/api/parse/test-llm", get(health::handle_gateway_test))
        .route("/api/parse/upload", post(extraction_handlers::handle_parse_upload))
        .route("/api/parse/structure", post(profile_handlers::handle_structure))
        .route("/api/rfp/upload", post(extraction_handlers::handle_rfp_upload))
        .route("/api/rfp/parse", post(extraction_handlers::handle_rfp_parse))
        .route("/api/srs/upload", post(extraction_handlers::handle_srs_upload))
        // Auth
        .route("/api/auth/verify-token", post(auth::handle_verify_token))
        // Provider account
        .route("/api/provider/onboard", post(profile_handlers::handle_onboard))
        .route(
            "/api/provider/profile",
            get(profile_handlers::handle_profile_get).put(profile_handlers::handle_profile_update),
        )
        .route(
            "/api/provider/profile/upload",
            post(profile_handlers::handle_profile_upload),
        )
        // Proposal pipeline
        .route("/api/proposal/generate", post(proposal_handlers::handle_generate))
        .route("/api/proposal/refine", post(proposal_handlers::handle_refine))
        .route("/api/dashboard/stats", get(proposal_handlers::handle_dashboard_stats))
        .layer(body_limit)
        .with_state(state)
}
