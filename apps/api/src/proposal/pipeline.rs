//! Proposal pipeline — orchestrates generation and refinement.
//!
//! Flow: build prompt → gateway invoke → extract JSON → sanitize →
//!       persist → refine pass → render report → assess feasibility.
//!
//! The generate phase is load-bearing: an extraction failure there fails
//! the whole request and nothing is persisted. The immediate refine pass is
//! advisory: on any failure the generated draft stands and the error is
//! reported alongside it.

use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::heuristics::parse_flexible_date;
use crate::llm_client::json::extract_json;
use crate::llm_client::{CallOptions, LlmGateway};
use crate::models::provider::ProviderRow;
use crate::models::rfp::{RfpRow, RfpStatus};
use crate::proposal::feasibility::{assess, FeasibilityVerdict};
use crate::proposal::prompts::{
    GENERATE_PROMPT_TEMPLATE, PROPOSAL_SCHEMA_JSON, REFINE_PROMPT_TEMPLATE,
};
use crate::proposal::render::render_html;
use crate::proposal::schema::{sanitize, ProposalDocument};

// ────────────────────────────────────────────────────────────────────────────
// Outcomes
// ────────────────────────────────────────────────────────────────────────────

/// Everything the generation endpoint reports back.
pub struct GenerateOutcome {
    pub rfp: RfpRow,
    pub proposal: ProposalDocument,
    pub report_html: String,
    pub feasibility: FeasibilityVerdict,
    /// Set when the embedded refine pass failed and the draft stands.
    pub refine_error: Option<String>,
}

/// Result of the standalone refine endpoint.
pub struct RefineOutcome {
    pub rfp: RfpRow,
    pub refined: ProposalDocument,
}

/// Dashboard aggregates over the RFP table.
#[derive(Debug, serde::Serialize)]
pub struct DashboardStats {
    pub total_bids: i64,
    pub pending_approvals: i64,
    pub recent: Vec<RfpRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full generate → refine pipeline for one approved overview.
///
/// Steps:
/// 1. build the generation prompt from overview + profile + SRS text
/// 2. gateway invoke, extract JSON (failure here fails the request)
/// 3. sanitize into the fixed schema
/// 4. INSERT the RFP record (status='Completed')
/// 5. refine pass; on success UPDATE the record, on failure keep the draft
/// 6. render the HTML report and assess feasibility on the surviving document
pub async fn generate_from_overview(
    db: &PgPool,
    gateway: &LlmGateway,
    provider: &ProviderRow,
    overview: Value,
    srs_text: String,
) -> Result<GenerateOutcome, AppError> {
    let profile_json = provider.profile.clone().unwrap_or_else(|| json!({}));

    // Step 1+2: generate
    let prompt = build_generate_prompt(&overview, &profile_json, &srs_text);
    let raw = gateway.invoke(&prompt, &CallOptions::default()).await?;
    let extracted = extract_json(&raw).map_err(|e| {
        warn!("proposal generator returned no parseable JSON; output began: {:.120}", raw);
        AppError::from(e)
    })?;

    // Step 3+4: sanitize and persist
    let proposal = sanitize(&extracted);
    let rfp = insert_rfp(db, generate_client_name(&overview), &overview, &proposal).await?;
    info!("generated proposal persisted as RFP {}", rfp.id);

    // Step 5: refine, advisory
    let (proposal, rfp, refine_error) =
        match refine_pass(db, gateway, &overview, &profile_json, &proposal, rfp.id).await {
            Ok((refined, updated)) => (refined, updated, None),
            Err(e) => {
                warn!("refine pass failed, keeping the generated draft: {e}");
                (proposal, rfp, Some(e.to_string()))
            }
        };

    // Step 6: report + feasibility on whichever document survived
    let report_html = render_html(&proposal, &rfp, provider);
    let feasibility = assess(&proposal, &provider.company_profile(), &overview);

    Ok(GenerateOutcome {
        rfp,
        proposal,
        report_html,
        feasibility,
        refine_error,
    })
}

/// Standalone refinement of an existing proposal document. Structurally the
/// refine phase of [`generate_from_overview`], but extraction failure is
/// fatal here and the result is persisted as a new RFP record.
pub async fn refine_existing(
    db: &PgPool,
    gateway: &LlmGateway,
    provider: &ProviderRow,
    overview: Value,
    existing: Value,
) -> Result<RefineOutcome, AppError> {
    let profile_json = provider.profile.clone().unwrap_or_else(|| json!({}));

    let prompt = build_refine_prompt(&overview, &profile_json, &existing);
    let raw = gateway.invoke(&prompt, &CallOptions::default()).await?;
    let extracted = extract_json(&raw).map_err(|e| {
        warn!("refiner returned no parseable JSON; output began: {:.120}", raw);
        AppError::from(e)
    })?;

    let refined = sanitize(&extracted);
    let rfp = insert_rfp(db, refine_client_name(&overview), &overview, &refined).await?;
    info!("refined proposal persisted as RFP {}", rfp.id);

    Ok(RefineOutcome { rfp, refined })
}

/// The embedded refine pass: prompt → invoke → extract → sanitize → UPDATE.
/// Every failure propagates; the caller decides whether it is fatal.
async fn refine_pass(
    db: &PgPool,
    gateway: &LlmGateway,
    overview: &Value,
    profile_json: &Value,
    proposal: &ProposalDocument,
    rfp_id: Uuid,
) -> Result<(ProposalDocument, RfpRow), AppError> {
    let proposal_json = serde_json::to_value(proposal)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize proposal: {e}")))?;

    let prompt = build_refine_prompt(overview, profile_json, &proposal_json);
    let raw = gateway.invoke(&prompt, &CallOptions::default()).await?;
    let refined = sanitize(&extract_json(&raw)?);

    let refined_json = serde_json::to_value(&refined)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize proposal: {e}")))?;
    let rfp = sqlx::query_as::<_, RfpRow>(
        "UPDATE rfps SET proposal = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(&refined_json)
    .bind(rfp_id)
    .fetch_one(db)
    .await?;

    Ok((refined, rfp))
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt building and overview reads
// ────────────────────────────────────────────────────────────────────────────

fn build_generate_prompt(overview: &Value, profile_json: &Value, srs_text: &str) -> String {
    let srs = if srs_text.trim().is_empty() {
        "[none]"
    } else {
        srs_text
    };
    GENERATE_PROMPT_TEMPLATE
        .replace("{overview_json}", &pretty(overview))
        .replace("{profile_json}", &pretty(profile_json))
        .replace("{srs_text}", srs)
        .replace("{schema_json}", PROPOSAL_SCHEMA_JSON)
}

fn build_refine_prompt(overview: &Value, profile_json: &Value, existing: &Value) -> String {
    REFINE_PROMPT_TEMPLATE
        .replace("{overview_json}", &overview.to_string())
        .replace("{profile_json}", &profile_json.to_string())
        .replace("{proposal_json}", &existing.to_string())
        .replace("{schema_json}", PROPOSAL_SCHEMA_JSON)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Client-name fallback chain used by the generation endpoint: identity
/// name, then the project overview text, then a fixed default.
fn generate_client_name(overview: &Value) -> String {
    overview
        .pointer("/company_identity/name")
        .and_then(Value::as_str)
        .or_else(|| overview.get("projectOverview").and_then(Value::as_str))
        .unwrap_or("Client")
        .to_string()
}

/// The standalone refine endpoint prefers the project overview for naming.
fn refine_client_name(overview: &Value) -> String {
    overview
        .get("projectOverview")
        .and_then(Value::as_str)
        .or_else(|| overview.pointer("/company_identity/name").and_then(Value::as_str))
        .unwrap_or("Client")
        .to_string()
}

/// SRS text already embedded in the overview wins over an uploaded PDF.
pub fn embedded_srs_text(overview: &Value) -> Option<String> {
    ["rawText", "fullText", "parsedText"].iter().find_map(|key| {
        overview
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    })
}

fn overview_number(overview: &Value, key: &str) -> Option<f64> {
    match overview.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn overview_strings(overview: &Value, key: &str) -> Vec<String> {
    overview
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

async fn insert_rfp(
    db: &PgPool,
    client_name: String,
    overview: &Value,
    proposal: &ProposalDocument,
) -> Result<RfpRow, AppError> {
    let budget = overview_number(overview, "budget");
    let deadline = overview
        .get("deadline")
        .and_then(Value::as_str)
        .and_then(|s| parse_flexible_date(s.trim()));
    let requirements = overview_strings(overview, "keyRequirements");
    let proposal_json = serde_json::to_value(proposal)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize proposal: {e}")))?;

    let rfp = sqlx::query_as::<_, RfpRow>(
        r#"
        INSERT INTO rfps (id, client_name, budget, deadline, requirements, status, proposal)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(client_name)
    .bind(budget)
    .bind(deadline)
    .bind(&requirements)
    .bind(RfpStatus::Completed.as_str())
    .bind(&proposal_json)
    .fetch_one(db)
    .await?;

    Ok(rfp)
}

/// Aggregates for the provider dashboard: total bids, in-flight count, and
/// the ten most recent records.
pub async fn dashboard_stats(db: &PgPool) -> Result<DashboardStats, AppError> {
    let total_bids: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rfps")
        .fetch_one(db)
        .await?;
    let pending_approvals: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM rfps WHERE status = $1")
            .bind(RfpStatus::Processing.as_str())
            .fetch_one(db)
            .await?;
    let recent = sqlx::query_as::<_, RfpRow>(
        "SELECT * FROM rfps ORDER BY created_at DESC LIMIT 10",
    )
    .fetch_all(db)
    .await?;

    Ok(DashboardStats {
        total_bids,
        pending_approvals,
        recent,
    })
}
