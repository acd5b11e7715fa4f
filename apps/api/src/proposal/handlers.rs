//! Proposal endpoints. Generation accepts either multipart (overview field
//! plus an optional SRS PDF) or a plain JSON body carrying the overview.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::authenticate;
use crate::errors::AppError;
use crate::extraction::pdf::extract_text;
use crate::models::rfp::RfpRow;
use crate::proposal::pipeline::{
    dashboard_stats, embedded_srs_text, generate_from_overview, refine_existing,
};
use crate::proposal::schema::ProposalDocument;
use crate::state::AppState;
use crate::upload::read_payload;

#[derive(Serialize)]
pub struct GenerateResponse {
    pub ok: bool,
    pub rfp: RfpRow,
    pub proposal: ProposalDocument,
    pub report_html: String,
    pub feasible: bool,
    pub feasibility_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refine_error: Option<String>,
}

/// POST /api/proposal/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<Json<GenerateResponse>, AppError> {
    let (_, provider) = authenticate(&state, &headers).await?;
    let (overview, pdf_text) = read_generate_input(request).await?;

    let srs_text = embedded_srs_text(&overview)
        .or(pdf_text)
        .unwrap_or_default();

    let outcome = generate_from_overview(&state.db, &state.gateway, &provider, overview, srs_text)
        .await?;

    Ok(Json(GenerateResponse {
        ok: true,
        rfp: outcome.rfp,
        proposal: outcome.proposal,
        report_html: outcome.report_html,
        feasible: outcome.feasibility.feasible,
        feasibility_reasons: outcome.feasibility.reasons,
        refine_error: outcome.refine_error,
    }))
}

/// Pulls the approved overview (and any SRS PDF text) out of either body
/// encoding. Multipart carries the overview as a form field; JSON carries
/// it under `approved_overview` or as the body itself.
async fn read_generate_input(request: Request) -> Result<(Value, Option<String>), AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?;
        let payload = read_payload(multipart).await?;

        let field = payload
            .fields
            .get("approved_overview")
            .or_else(|| payload.fields.get("approvedOverview"))
            .ok_or_else(|| AppError::Validation("approved_overview is required".to_string()))?;
        let overview = parse_overview_field(field);

        let pdf_text = payload
            .file
            .map(|file| extract_text(&file.bytes))
            .filter(|text| !text.trim().is_empty());

        Ok((overview, pdf_text))
    } else {
        let Json(body): Json<Value> = Json::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))?;
        Ok((overview_from_body(body)?, None))
    }
}

/// Form fields arrive as text; JSON text becomes the parsed value, anything
/// else is kept verbatim as a string overview.
fn parse_overview_field(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn overview_from_body(body: Value) -> Result<Value, AppError> {
    if let Some(candidate) = body
        .get("approved_overview")
        .or_else(|| body.get("approvedOverview"))
    {
        return Ok(match candidate {
            Value::String(s) => {
                serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone()))
            }
            other => other.clone(),
        });
    }
    match &body {
        Value::Object(map) if !map.is_empty() => Ok(body),
        _ => Err(AppError::Validation(
            "approved_overview is required".to_string(),
        )),
    }
}

#[derive(Deserialize)]
pub struct RefineRequest {
    #[serde(alias = "approvedOverview")]
    pub approved_overview: Option<Value>,
    #[serde(alias = "existingProposal")]
    pub existing_proposal: Option<Value>,
}

/// POST /api/proposal/refine
pub async fn handle_refine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RefineRequest>,
) -> Result<Json<Value>, AppError> {
    let (_, provider) = authenticate(&state, &headers).await?;
    let overview = req
        .approved_overview
        .ok_or_else(|| AppError::Validation("approved_overview is required".to_string()))?;
    let existing = req
        .existing_proposal
        .ok_or_else(|| AppError::Validation("existing_proposal is required".to_string()))?;

    let outcome = refine_existing(&state.db, &state.gateway, &provider, overview, existing).await?;

    Ok(Json(json!({
        "ok": true,
        "rfp": outcome.rfp,
        "refined": outcome.refined,
    })))
}

/// GET /api/dashboard/stats
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    authenticate(&state, &headers).await?;
    let stats = dashboard_stats(&state.db).await?;

    Ok(Json(json!({
        "ok": true,
        "total_bids": stats.total_bids,
        "pending_approvals": stats.pending_approvals,
        "recent": stats.recent,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_rfp() -> RfpRow {
        RfpRow {
            id: Uuid::new_v4(),
            client_name: Some("Client".to_string()),
            raw_text: None,
            budget: None,
            deadline: None,
            requirements: Vec::new(),
            status: "Completed".to_string(),
            proposal: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_response_carries_refine_error_only_when_present() {
        let clean = GenerateResponse {
            ok: true,
            rfp: sample_rfp(),
            proposal: ProposalDocument::default(),
            report_html: String::new(),
            feasible: true,
            feasibility_reasons: Vec::new(),
            refine_error: None,
        };
        let value = serde_json::to_value(&clean).unwrap();
        assert!(value.get("refine_error").is_none());
        assert_eq!(value["ok"], json!(true));

        let degraded = GenerateResponse {
            refine_error: Some("refinement pass failed".to_string()),
            ..clean
        };
        let value = serde_json::to_value(&degraded).unwrap();
        assert_eq!(value["refine_error"], json!("refinement pass failed"));
        assert_eq!(value["ok"], json!(true));
    }

    #[test]
    fn test_parse_overview_field_json_and_plain() {
        assert_eq!(
            parse_overview_field("{\"budget\": 10}"),
            json!({ "budget": 10 })
        );
        assert_eq!(
            parse_overview_field("just a description"),
            json!("just a description")
        );
    }

    #[test]
    fn test_overview_from_body_key_variants() {
        let body = json!({ "approved_overview": { "budget": 10 } });
        assert_eq!(overview_from_body(body).unwrap(), json!({ "budget": 10 }));

        let body = json!({ "approvedOverview": "{\"budget\": 10}" });
        assert_eq!(overview_from_body(body).unwrap(), json!({ "budget": 10 }));

        let body = json!({ "approvedOverview": "plain text overview" });
        assert_eq!(
            overview_from_body(body).unwrap(),
            json!("plain text overview")
        );
    }

    #[test]
    fn test_overview_from_body_falls_back_to_whole_object() {
        let body = json!({ "projectOverview": "portal", "budget": 5 });
        assert_eq!(overview_from_body(body.clone()).unwrap(), body);
    }

    #[test]
    fn test_overview_from_body_rejects_empty() {
        assert!(overview_from_body(json!({})).is_err());
        assert!(overview_from_body(json!(null)).is_err());
    }
}
