//! The structured company-profile schema.
//!
//! Every field defaults, so a partially extracted document always coerces to
//! a complete value. The stored JSONB stays opaque to the database; this
//! schema is the application-side contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What a provider can offer: identity, declared services, stack, delivery
/// capability, and pricing rules. Embedded into generation prompts and read
/// by the feasibility rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderProfile {
    pub company_identity: CompanyIdentity,
    /// Declared services: service name → currently offered.
    pub services: BTreeMap<String, bool>,
    pub tech_stack: TechStack,
    pub delivery_capability: DeliveryCapability,
    pub pricing: PricingRules,
    pub compliance: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyIdentity {
    pub name: String,
    pub website: String,
    pub contact: ContactInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

/// Technology buckets. A technology may appear in more than one bucket when
/// it matches several category keyword tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechStack {
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
    pub database: Vec<String>,
    pub cloud: Vec<String>,
    pub devops: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryCapability {
    pub team_size: String,
    pub methodologies: Vec<String>,
    pub delivery_locations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    pub currency: String,
    pub pricing_model: String,
    pub base_monthly_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_document_fills_defaults() {
        let value = json!({
            "company_identity": { "name": "Acme Solutions" },
            "services": { "Web Development": true }
        });
        let profile: ProviderProfile = serde_json::from_value(value).unwrap();

        assert_eq!(profile.company_identity.name, "Acme Solutions");
        assert_eq!(profile.services.get("Web Development"), Some(&true));
        assert!(profile.company_identity.contact.email.is_empty());
        assert!(profile.tech_stack.frontend.is_empty());
        assert_eq!(profile.pricing.base_monthly_rate, 0.0);
    }

    #[test]
    fn test_empty_document_is_default() {
        let profile: ProviderProfile = serde_json::from_value(json!({})).unwrap();
        assert_eq!(profile, ProviderProfile::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let value = json!({ "company_identity": { "name": "X" }, "founded": 1998 });
        let profile: ProviderProfile = serde_json::from_value(value).unwrap();
        assert_eq!(profile.company_identity.name, "X");
    }
}
