#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle states stored in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RfpStatus {
    Uploaded,
    Processing,
    Completed,
}

impl RfpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RfpStatus::Uploaded => "Uploaded",
            RfpStatus::Processing => "Processing",
            RfpStatus::Completed => "Completed",
        }
    }
}

/// One RFP engagement: the client ask plus the generated proposal document.
/// `proposal` is the sanitized ten-section document as JSONB.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RfpRow {
    pub id: Uuid,
    pub client_name: Option<String>,
    pub raw_text: Option<String>,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub requirements: Vec<String>,
    pub status: String,
    pub proposal: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings_match_stored_values() {
        assert_eq!(RfpStatus::Uploaded.as_str(), "Uploaded");
        assert_eq!(RfpStatus::Processing.as_str(), "Processing");
        assert_eq!(RfpStatus::Completed.as_str(), "Completed");
    }
}
