use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm_client::prompts::GATEWAY_TEST_PROMPT;
use crate::llm_client::CallOptions;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "bidforge-api"
    }))
}

/// GET /api/parse/test-llm
/// Fires a tiny JSON prompt through the gateway and echoes the normalized
/// output. Fails fast when no calling convention is configured.
pub async fn handle_gateway_test(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let shapes = state.gateway.configured_shapes();
    if shapes.is_empty() {
        return Err(AppError::Validation(
            "No LLM calling convention is configured".to_string(),
        ));
    }

    let options = CallOptions {
        max_tokens: 200,
        json_mode: false,
        ..CallOptions::default()
    };
    let raw = state.gateway.invoke(GATEWAY_TEST_PROMPT, &options).await?;

    Ok(Json(json!({
        "ok": true,
        "shapes": shapes.iter().map(ToString::to_string).collect::<Vec<String>>(),
        "raw": raw,
    })))
}
