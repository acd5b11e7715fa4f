//! Document intake endpoints: PDF to text, text to RFP signals, and PDF to
//! a structured SRS. All of these are stateless parsing surfaces.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::extraction::heuristics::parse_rfp_text;
use crate::extraction::pdf::extract_text;
use crate::extraction::srs::extract_srs;
use crate::state::AppState;
use crate::upload::read_payload;

/// POST /api/parse/upload
///
/// Generic PDF intake: returns the file metadata and extracted text.
pub async fn handle_parse_upload(multipart: Multipart) -> Result<Json<Value>, AppError> {
    let file = read_payload(multipart).await?.require_file()?;
    let raw_text = extract_text(&file.bytes);

    Ok(Json(json!({
        "ok": true,
        "file": {
            "original_name": file.file_name,
            "mime_type": file.content_type,
            "size": file.bytes.len(),
        },
        "raw_text": raw_text,
    })))
}

/// POST /api/rfp/upload
pub async fn handle_rfp_upload(multipart: Multipart) -> Result<Json<Value>, AppError> {
    let file = read_payload(multipart).await?.require_file()?;
    let raw_text = extract_text(&file.bytes);

    Ok(Json(json!({
        "ok": true,
        "raw_text": raw_text,
    })))
}

#[derive(Deserialize)]
pub struct ParseRfpRequest {
    #[serde(alias = "rawText")]
    pub raw_text: Option<String>,
}

/// POST /api/rfp/parse
///
/// Label-and-pattern scan of RFP text for client name, budget, deadline and
/// the requirements list. No LLM involved.
pub async fn handle_rfp_parse(Json(req): Json<ParseRfpRequest>) -> Result<Json<Value>, AppError> {
    let raw_text = req
        .raw_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("raw_text is required".to_string()))?;

    let signals = parse_rfp_text(&raw_text);
    Ok(Json(json!({
        "ok": true,
        "signals": signals,
    })))
}

/// POST /api/srs/upload
///
/// SRS PDF to a structured requirements document, via the LLM when
/// configured and the heuristics otherwise.
pub async fn handle_srs_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let file = read_payload(multipart).await?.require_file()?;
    let raw_text = extract_text(&file.bytes);
    let srs = extract_srs(&state.gateway, &raw_text).await;

    Ok(Json(json!({
        "ok": true,
        "srs": srs,
    })))
}
