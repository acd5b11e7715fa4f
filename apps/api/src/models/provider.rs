#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::profile::schema::ProviderProfile;

/// A provider account. `profile` holds the structured company profile as an
/// opaque JSONB document; basics like `company_name` are denormalized onto
/// columns for listings and quick onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProviderRow {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub verified: bool,
    pub company_name: Option<String>,
    pub tech_stack: Vec<String>,
    pub pricing_model: Option<String>,
    pub base_rate: Option<f64>,
    pub profile: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderRow {
    /// Typed view of the stored profile document. A missing or malformed
    /// document coerces to the all-defaults profile.
    pub fn company_profile(&self) -> ProviderProfile {
        self.profile
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Display name used on rendered documents.
    pub fn display_name(&self) -> &str {
        self.company_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Provider")
    }
}
