//! Regex fallbacks over raw document text.
//!
//! These run when no model is reachable, so they only promise labeled-field
//! recovery: an unlabeled value is simply absent. All patterns are compiled
//! once and cached.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Cap on harvested requirement lines.
const MAX_REQUIREMENTS: usize = 50;

/// Signals recoverable from raw RFP text without a model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RfpSignals {
    pub client_name: Option<String>,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub requirements: Vec<String>,
}

/// Basics recoverable from a provider one-pager via labeled fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub company_name: Option<String>,
    pub tech_stack: Vec<String>,
    pub base_rate: Option<f64>,
}

fn budget_label() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:Budget|Estimated Budget|Total Budget|Budget Range)[:\s]*\$?\s*([\d.,]+)")
            .unwrap()
    })
}

fn currency_amount() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[$£€]\s*([\d,]+)").unwrap())
}

fn deadline_label() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(?:Deadline|Submission Deadline|Due Date|Due by)[:\s]*([0-9]{4}-[0-9]{2}-[0-9]{2}|[A-Za-z0-9 ,]+)",
        )
        .unwrap()
    })
}

fn client_label() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:Client|Client Name|Company|Organization)[:\s]*([A-Za-z0-9 .&-]+)")
            .unwrap()
    })
}

fn requirements_heading() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(?:Requirements|Scope of Work|Deliverables|Key Requirements|Scope)[:\s]*([\s\S]{0,2000})",
        )
        .unwrap()
    })
}

fn bullet_marker() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[-•]|\d+\.").unwrap())
}

fn bullet_split() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:\r?\n|[-•]|\d+\.)").unwrap())
}

fn bullet_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:[-•]\s*|\d+\.\s*)").unwrap())
}

/// Labeled-field scan over raw RFP text: budget, deadline, client name, and
/// a harvested requirements list.
pub fn parse_rfp_text(text: &str) -> RfpSignals {
    let budget = budget_label()
        .captures(text)
        .or_else(|| currency_amount().captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok());

    let deadline = deadline_label()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_flexible_date(m.as_str().trim()));

    let client_name = client_label()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty());

    RfpSignals {
        client_name,
        budget,
        deadline,
        requirements: harvest_requirements(text),
    }
}

/// Labeled-field scan over a provider capability sheet.
pub fn parse_provider_summary(text: &str) -> ProviderSummary {
    static TECH_STACK: OnceLock<Regex> = OnceLock::new();
    static RATE: OnceLock<Regex> = OnceLock::new();
    static COMPANY: OnceLock<Regex> = OnceLock::new();

    let tech_stack = TECH_STACK
        .get_or_init(|| Regex::new(r"(?i)Tech Stack[:\s]*([A-Za-z0-9, /&-]+)").unwrap())
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .split(|c| matches!(c, ',' | '\n' | '/' | '&'))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let base_rate = RATE
        .get_or_init(|| Regex::new(r"(?i)Rates?:?\s*\$?([\d,.]+)").unwrap())
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok());

    let company_name = COMPANY
        .get_or_init(|| Regex::new(r"(?i)Company[:\s]*([A-Za-z0-9 .&-]+)").unwrap())
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty());

    ProviderSummary {
        company_name,
        tech_stack,
        base_rate,
    }
}

/// Lenient date parsing for values like "2026-03-01", "March 1, 2026" or
/// "1 March 2026". Returns midnight UTC of the parsed day.
pub fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%B %d, %Y",
        "%b %d, %Y",
        "%d %B %Y",
        "%d %b %Y",
        "%m/%d/%Y",
        "%Y/%m/%d",
    ];
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Requirements come from a labeled section when one exists, split on line
/// breaks and bullet markers; otherwise bullet-looking lines are harvested
/// from the whole text.
fn harvest_requirements(text: &str) -> Vec<String> {
    if let Some(block) = requirements_heading()
        .captures(text)
        .and_then(|caps| caps.get(1))
    {
        let items: Vec<String> = bullet_split()
            .split(block.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(MAX_REQUIREMENTS)
            .map(String::from)
            .collect();
        if !items.is_empty() {
            return items;
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| bullet_marker().is_match(line))
        .map(|line| bullet_prefix().replace(line, "").trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_REQUIREMENTS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_budget_from_label() {
        let signals = parse_rfp_text("Estimated Budget: $120,000 for phase one");
        assert_eq!(signals.budget, Some(120000.0));
    }

    #[test]
    fn test_budget_from_currency_symbol() {
        let signals = parse_rfp_text("We can spend up to £45,000 on this.");
        assert_eq!(signals.budget, Some(45000.0));
    }

    #[test]
    fn test_missing_budget_is_none() {
        assert_eq!(parse_rfp_text("no figures here").budget, None);
    }

    #[test]
    fn test_deadline_iso_and_verbose() {
        let signals = parse_rfp_text("Submission Deadline: 2026-03-01");
        let deadline = signals.deadline.unwrap();
        assert_eq!((deadline.year(), deadline.month(), deadline.day()), (2026, 3, 1));

        let signals = parse_rfp_text("Due Date: March 1, 2026\nother text");
        assert_eq!(signals.deadline.unwrap().year(), 2026);
    }

    #[test]
    fn test_unparseable_deadline_is_none() {
        let signals = parse_rfp_text("Deadline: as soon as possible");
        assert_eq!(signals.deadline, None);
    }

    #[test]
    fn test_client_name() {
        let signals = parse_rfp_text("Client: Northwind Traders Ltd.\nBudget: 5000");
        assert_eq!(signals.client_name.as_deref(), Some("Northwind Traders Ltd."));
    }

    #[test]
    fn test_requirements_from_labeled_section() {
        let text = "Scope of Work:\n- user login\n- admin dashboard\n- reporting\nEnd.";
        let signals = parse_rfp_text(text);
        assert!(signals.requirements.contains(&"user login".to_string()));
        assert!(signals.requirements.contains(&"admin dashboard".to_string()));
    }

    #[test]
    fn test_requirements_from_bullet_lines_without_heading() {
        let text = "Intro paragraph.\n- build an API\n- ship a mobile app\nClosing.";
        let signals = parse_rfp_text(text);
        assert_eq!(
            signals.requirements,
            vec!["build an API".to_string(), "ship a mobile app".to_string()]
        );
    }

    #[test]
    fn test_requirements_cap() {
        let mut text = String::from("Requirements:\n");
        for i in 0..80 {
            text.push_str(&format!("item number {i}\n"));
        }
        let signals = parse_rfp_text(&text);
        assert_eq!(signals.requirements.len(), 50);
    }

    #[test]
    fn test_provider_summary_fields() {
        let text = "Company: Acme Solutions\nTech Stack: React, Node, Postgres\nRates: $4,500 per month";
        let summary = parse_provider_summary(text);

        assert_eq!(summary.company_name.as_deref(), Some("Acme Solutions"));
        assert_eq!(summary.tech_stack, vec!["React", "Node", "Postgres"]);
        assert_eq!(summary.base_rate, Some(4500.0));
    }

    #[test]
    fn test_provider_summary_on_unlabeled_text() {
        let summary = parse_provider_summary("We are a consultancy.");
        assert_eq!(summary.company_name, None);
        assert!(summary.tech_stack.is_empty());
        assert_eq!(summary.base_rate, None);
    }

    #[test]
    fn test_flexible_date_formats() {
        for raw in ["2026-03-01", "March 1, 2026", "Mar 1, 2026", "1 March 2026", "03/01/2026"] {
            let parsed = parse_flexible_date(raw).unwrap_or_else(|| panic!("failed on {raw}"));
            assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2026, 3, 1));
        }
        assert_eq!(parse_flexible_date("soon"), None);
    }
}
