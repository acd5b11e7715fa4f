//! Proposal renderers: markdown for human review, self-contained HTML for
//! PDF conversion downstream. Both walk the sanitized document, so every
//! section is present even when empty.

#![allow(dead_code)]

use crate::models::provider::ProviderRow;
use crate::models::rfp::RfpRow;
use crate::proposal::schema::ProposalDocument;

/// Markdown rendition with the nine numbered sections.
pub fn render_markdown(proposal: &ProposalDocument, rfp: &RfpRow, provider: &ProviderRow) -> String {
    let pricing = &proposal.pricing_and_commercials;
    let team = &pricing.team_composition;

    let mut lines: Vec<String> = Vec::new();
    lines.push("# Request for Proposal (RFP) Response".to_string());
    lines.push(String::new());
    lines.push(format!("**Submitted By:** {}", provider.display_name()));
    lines.push(format!(
        "**Submitted To:** {}",
        rfp.client_name.as_deref().unwrap_or("Client")
    ));
    lines.push(format!(
        "**Submission Date:** {}",
        rfp.created_at.format("%Y-%m-%d")
    ));
    lines.push("---".to_string());

    lines.push("## 1. Executive Summary".to_string());
    lines.push(format!("**Overview:** {}", proposal.executive_summary.overview));
    lines.push(String::new());
    lines.push(format!(
        "**Value Proposition:** {}",
        proposal.executive_summary.value_proposition
    ));
    lines.push("---".to_string());

    let understanding = &proposal.understanding_of_requirements;
    lines.push("## 2. Understanding of Client Requirements".to_string());
    lines.push("### 2.1 Project Overview".to_string());
    lines.push(understanding.project_overview.clone());
    lines.push(String::new());
    lines.push("### 2.2 Key Objectives".to_string());
    lines.extend(understanding.key_objectives.iter().map(|k| format!("- {k}")));
    lines.push(String::new());
    lines.push("### 2.3 In-Scope".to_string());
    lines.extend(understanding.in_scope.iter().map(|k| format!("- {k}")));
    lines.push(String::new());
    lines.push("### 2.4 Out-of-Scope".to_string());
    lines.extend(understanding.out_of_scope.iter().map(|k| format!("- {k}")));
    lines.push("---".to_string());

    lines.push("## 3. Proposed Solution & Architecture".to_string());
    lines.push(proposal.solution_architecture.architecture_overview.clone());
    lines.push(String::new());
    lines.push("### Components".to_string());
    lines.extend(
        proposal
            .solution_architecture
            .components
            .iter()
            .map(|c| format!("- {c}")),
    );
    lines.push("---".to_string());

    lines.push("## 4. Delivery Plan & Timeline".to_string());
    for phase in &proposal.delivery_plan.phases {
        lines.push(format!(
            "### {} | Duration: {} weeks",
            phase.phase_name, phase.duration_weeks
        ));
        lines.push("Deliverables:".to_string());
        lines.extend(phase.deliverables.iter().map(|d| format!("- {d}")));
        lines.push(String::new());
    }
    lines.push(format!(
        "**Total Estimated Duration:** {} Months",
        proposal.delivery_plan.total_duration_months
    ));
    lines.push("---".to_string());

    lines.push("## 5. Pricing & Commercials".to_string());
    lines.push(format!("**Currency:** {}", pricing.currency));
    lines.push("### Team Composition".to_string());
    lines.push(format!(
        "- {} x {} @ {} {}/month",
        team.role, team.count, pricing.currency, team.monthly_cost
    ));
    lines.push(format!(
        "**Total Project Cost:** {} {}",
        pricing.currency, pricing.total_cost
    ));
    if !pricing.pricing_notes.is_empty() {
        lines.push(String::new());
        lines.push(format!("**Pricing Notes:** {}", pricing.pricing_notes));
    }
    lines.push("---".to_string());

    lines.push("## 6. Requirement Traceability Matrix (RTM)".to_string());
    lines.extend(proposal.requirement_traceability_matrix.iter().map(|r| {
        format!(
            "- {}: {} → {} [{}]",
            r.requirement_id, r.requirement, r.solution_reference, r.status
        )
    }));
    lines.push("---".to_string());

    lines.push("## 7. Assumptions & Exclusions".to_string());
    lines.push("### Assumptions".to_string());
    lines.extend(
        proposal
            .assumptions_and_exclusions
            .assumptions
            .iter()
            .map(|a| format!("- {a}")),
    );
    lines.push("### Exclusions".to_string());
    lines.extend(
        proposal
            .assumptions_and_exclusions
            .exclusions
            .iter()
            .map(|a| format!("- {a}")),
    );
    lines.push("---".to_string());

    lines.push("## 8. Risk & Mitigation".to_string());
    lines.extend(proposal.risk_and_mitigation.iter().map(|r| {
        format!("- **{}** (Impact: {}): {}", r.risk, r.impact, r.mitigation)
    }));
    lines.push("---".to_string());

    lines.push("## 9. Company Credentials".to_string());
    lines.extend(
        proposal
            .company_credentials
            .relevant_experience
            .iter()
            .map(|c| format!("- {c}")),
    );
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push("**End of Proposal**".to_string());

    lines.join("\n")
}

/// Self-contained HTML rendition, styled inline so it converts to PDF
/// without external assets.
pub fn render_html(proposal: &ProposalDocument, rfp: &RfpRow, provider: &ProviderRow) -> String {
    let pricing = &proposal.pricing_and_commercials;
    let team = &pricing.team_composition;
    let understanding = &proposal.understanding_of_requirements;

    let mut parts: Vec<String> = Vec::new();
    parts.push(
        "<html><head><meta charset=\"utf-8\"/><style>body{font-family:Arial,sans-serif;margin:32px;color:#222}h1,h2,h3{color:#0b559f}table{width:100%;border-collapse:collapse}th,td{padding:8px;border:1px solid #ddd;text-align:left}</style></head><body>"
            .to_string(),
    );
    parts.push("<h1>Request for Proposal (RFP) Response</h1>".to_string());
    parts.push(format!(
        "<div><strong>Submitted By:</strong> {}<br/><strong>Client:</strong> {}<br/><strong>Date:</strong> {}</div>",
        escape_html(provider.display_name()),
        escape_html(rfp.client_name.as_deref().unwrap_or("Client")),
        rfp.created_at.format("%Y-%m-%d")
    ));

    parts.push("<h2>1. Executive Summary</h2>".to_string());
    parts.push(format!(
        "<p><strong>Overview:</strong> {}</p>",
        escape_html(&proposal.executive_summary.overview)
    ));
    parts.push(format!(
        "<p><strong>Value Proposition:</strong> {}</p>",
        escape_html(&proposal.executive_summary.value_proposition)
    ));

    parts.push("<h2>2. Understanding of Client Requirements</h2>".to_string());
    parts.push(format!(
        "<p><strong>Project Overview:</strong> {}</p>",
        escape_html(&understanding.project_overview)
    ));
    push_list(&mut parts, "Key Objectives", &understanding.key_objectives);
    push_list(&mut parts, "In Scope", &understanding.in_scope);
    push_list(&mut parts, "Out of Scope", &understanding.out_of_scope);

    parts.push("<h2>3. Solution Architecture</h2>".to_string());
    parts.push(format!(
        "<p>{}</p>",
        escape_html(&proposal.solution_architecture.architecture_overview)
    ));
    push_list(&mut parts, "Components", &proposal.solution_architecture.components);

    parts.push("<h2>4. Delivery Plan &amp; Timeline</h2>".to_string());
    for phase in &proposal.delivery_plan.phases {
        parts.push(format!(
            "<h4>{}: {} weeks</h4>",
            escape_html(&phase.phase_name),
            phase.duration_weeks
        ));
        parts.push("<ul>".to_string());
        parts.extend(
            phase
                .deliverables
                .iter()
                .map(|d| format!("<li>{}</li>", escape_html(d))),
        );
        parts.push("</ul>".to_string());
    }
    parts.push(format!(
        "<p><strong>Total Duration (months):</strong> {}</p>",
        proposal.delivery_plan.total_duration_months
    ));

    parts.push("<h2>5. Pricing &amp; Commercials</h2>".to_string());
    parts.push(format!(
        "<p><strong>Currency:</strong> {}</p>",
        escape_html(&pricing.currency)
    ));
    parts.push(format!(
        "<p><strong>Team Composition:</strong> {} x {} @ {}/month</p>",
        escape_html(&team.role),
        team.count,
        team.monthly_cost
    ));
    parts.push(format!(
        "<p><strong>Total Cost:</strong> {}</p>",
        pricing.total_cost
    ));
    if !pricing.pricing_notes.is_empty() {
        parts.push(format!("<p>{}</p>", escape_html(&pricing.pricing_notes)));
    }

    parts.push("<h2>6. Requirement Traceability Matrix</h2><ul>".to_string());
    parts.extend(proposal.requirement_traceability_matrix.iter().map(|r| {
        format!(
            "<li>{}: {} → {} [{}]",
            escape_html(&r.requirement_id),
            escape_html(&r.requirement),
            escape_html(&r.solution_reference),
            escape_html(&r.status)
        ) + "</li>"
    }));
    parts.push("</ul>".to_string());

    parts.push("<h2>7. Assumptions &amp; Exclusions</h2>".to_string());
    push_list(&mut parts, "Assumptions", &proposal.assumptions_and_exclusions.assumptions);
    push_list(&mut parts, "Exclusions", &proposal.assumptions_and_exclusions.exclusions);

    parts.push("<h2>8. Risk &amp; Mitigation</h2><ul>".to_string());
    parts.extend(proposal.risk_and_mitigation.iter().map(|r| {
        format!(
            "<li><strong>{}</strong> ({}): {}</li>",
            escape_html(&r.risk),
            escape_html(&r.impact),
            escape_html(&r.mitigation)
        )
    }));
    parts.push("</ul>".to_string());

    parts.push("<h2>9. Company Credentials</h2><ul>".to_string());
    parts.extend(
        proposal
            .company_credentials
            .relevant_experience
            .iter()
            .map(|c| format!("<li>{}</li>", escape_html(c))),
    );
    parts.push("</ul>".to_string());

    parts.push("<p><em>End of Proposal</em></p>".to_string());
    parts.push("</body></html>".to_string());
    parts.join("")
}

fn push_list(parts: &mut Vec<String>, title: &str, items: &[String]) {
    parts.push(format!("<h3>{title}</h3><ul>"));
    parts.extend(items.iter().map(|item| format!("<li>{}</li>", escape_html(item))));
    parts.push("</ul>".to_string());
}

/// Minimal entity escaping. `&` first, or it would re-escape the others.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
