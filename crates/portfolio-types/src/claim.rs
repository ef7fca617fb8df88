use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Claim status, doubling as the Kanban column key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Open,
    InReview,
    Processing,
    Closed,
    /// Any status string the board has no column for
    #[serde(other)]
    Unknown,
}

impl ClaimStatus {
    /// Board columns in display order
    pub const COLUMNS: [ClaimStatus; 4] = [
        ClaimStatus::Open,
        ClaimStatus::InReview,
        ClaimStatus::Processing,
        ClaimStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Open => "open",
            ClaimStatus::InReview => "in_review",
            ClaimStatus::Processing => "processing",
            ClaimStatus::Closed => "closed",
            ClaimStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Some(ClaimStatus::Open),
            "in_review" | "in-review" => Some(ClaimStatus::InReview),
            "processing" => Some(ClaimStatus::Processing),
            "closed" => Some(ClaimStatus::Closed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClaimStatus::Open => "Open",
            ClaimStatus::InReview => "In Review",
            ClaimStatus::Processing => "Processing",
            ClaimStatus::Closed => "Closed",
            ClaimStatus::Unknown => "Unknown",
        }
    }

    pub fn is_column(&self) -> bool {
        !matches!(self, ClaimStatus::Unknown)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    #[serde(default)]
    pub claim_number: String,
    #[serde(default)]
    pub property_id: String,
    #[serde(default)]
    pub property_name: Option<String>,
    pub status: ClaimStatus,
    #[serde(default)]
    pub claim_type: String,
    #[serde(default)]
    pub date_of_loss: Option<NaiveDate>,
    #[serde(default)]
    pub date_reported: Option<NaiveDate>,
    #[serde(default)]
    pub amount_incurred: f64,
    #[serde(default)]
    pub attachment_count: u32,
    #[serde(default)]
    pub has_alert: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ClaimStatus::InReview).unwrap();
        assert_eq!(json, "\"in_review\"");
    }

    #[test]
    fn test_unrecognized_status_deserializes_to_unknown() {
        let json = r#"{"id": "c9", "status": "reopened"}"#;
        let claim: Claim = serde_json::from_str(json).unwrap();
        assert_eq!(claim.status, ClaimStatus::Unknown);
        assert!(!claim.status.is_column());
    }

    #[test]
    fn test_parse_accepts_hyphenated_review() {
        assert_eq!(ClaimStatus::parse("in-review"), Some(ClaimStatus::InReview));
        assert_eq!(ClaimStatus::parse("CLOSED"), Some(ClaimStatus::Closed));
        assert_eq!(ClaimStatus::parse("unknown"), None);
    }
}
