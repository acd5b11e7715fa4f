//! Provider profile endpoints: quick onboarding from a company PDF, full
//! profile extraction, and direct reads/writes of the stored document.

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::authenticate;
use crate::errors::AppError;
use crate::extraction::heuristics::parse_provider_summary;
use crate::extraction::pdf::extract_text;
use crate::models::provider::ProviderRow;
use crate::profile::extract::extract_company_profile;
use crate::state::AppState;
use crate::upload::read_payload;

/// POST /api/provider/onboard
///
/// Fast-path onboarding: pull the company name, tech stack and base rate
/// out of an uploaded company PDF and write them straight onto the
/// provider row. Fields the PDF does not yield keep their current values.
pub async fn handle_onboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let (_, provider) = authenticate(&state, &headers).await?;
    let file = read_payload(multipart).await?.require_file()?;
    let raw_text = extract_text(&file.bytes);

    let summary = parse_provider_summary(&raw_text);
    let company_name = summary
        .company_name
        .clone()
        .or_else(|| provider.company_name.clone());
    let tech_stack = if summary.tech_stack.is_empty() {
        provider.tech_stack.clone()
    } else {
        summary.tech_stack.clone()
    };
    let base_rate = summary.base_rate.or(provider.base_rate);

    let updated = sqlx::query_as::<_, ProviderRow>(
        "UPDATE providers SET company_name = $1, tech_stack = $2, base_rate = $3, \
         updated_at = NOW() WHERE id = $4 RETURNING *",
    )
    .bind(&company_name)
    .bind(&tech_stack)
    .bind(base_rate)
    .bind(provider.id)
    .fetch_one(&state.db)
    .await?;
    info!("onboarded provider {}", updated.id);

    Ok(Json(json!({
        "ok": true,
        "provider": updated,
        "parsed": summary,
    })))
}

/// POST /api/provider/profile/upload
///
/// Full profile extraction: PDF text through the LLM (or the keyword
/// heuristics when no gateway is configured) into the structured profile
/// document, persisted as JSONB on the provider row.
pub async fn handle_profile_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let (_, provider) = authenticate(&state, &headers).await?;
    let file = read_payload(multipart).await?.require_file()?;
    let raw_text = extract_text(&file.bytes);

    let mut profile = extract_company_profile(&state.gateway, &raw_text).await;
    if profile.company_identity.contact.email.is_empty() {
        if let Some(email) = &provider.email {
            profile.company_identity.contact.email = email.clone();
        }
    }
    let company_name = Some(profile.company_identity.name.clone())
        .filter(|name| !name.trim().is_empty());

    let profile_json = serde_json::to_value(&profile)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize profile: {e}")))?;
    let updated = sqlx::query_as::<_, ProviderRow>(
        "UPDATE providers SET profile = $1, company_name = COALESCE($2, company_name), \
         updated_at = NOW() WHERE id = $3 RETURNING *",
    )
    .bind(&profile_json)
    .bind(&company_name)
    .bind(provider.id)
    .fetch_one(&state.db)
    .await?;
    info!("stored extracted profile for provider {}", updated.id);

    Ok(Json(json!({
        "ok": true,
        "profile": profile,
        "provider": updated,
    })))
}

/// GET /api/provider/profile
pub async fn handle_profile_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let (_, provider) = authenticate(&state, &headers).await?;
    Ok(Json(json!({
        "ok": true,
        "profile": provider.profile,
        "provider": provider,
    })))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub profile: Option<Value>,
}

/// PUT /api/provider/profile
///
/// Stores the submitted profile document as-is. The company name column is
/// denormalized from it when present.
pub async fn handle_profile_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let (_, provider) = authenticate(&state, &headers).await?;
    let profile = req
        .profile
        .ok_or_else(|| AppError::Validation("profile is required".to_string()))?;

    let company_name = profile
        .pointer("/company_identity/name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from);

    let updated = sqlx::query_as::<_, ProviderRow>(
        "UPDATE providers SET profile = $1, company_name = COALESCE($2, company_name), \
         updated_at = NOW() WHERE id = $3 RETURNING *",
    )
    .bind(&profile)
    .bind(&company_name)
    .bind(provider.id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(json!({
        "ok": true,
        "profile": updated.profile,
        "provider": updated,
    })))
}

#[derive(Deserialize)]
pub struct StructureRequest {
    #[serde(alias = "rawText")]
    pub raw_text: Option<String>,
}

/// POST /api/parse/structure
///
/// Structures already-extracted text into a profile document without
/// touching any account. Useful for previews before committing.
pub async fn handle_structure(
    State(state): State<AppState>,
    Json(req): Json<StructureRequest>,
) -> Result<Json<Value>, AppError> {
    let raw_text = req
        .raw_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("raw_text is required".to_string()))?;

    let profile = extract_company_profile(&state.gateway, &raw_text).await;
    Ok(Json(json!({
        "ok": true,
        "profile": profile,
    })))
}
