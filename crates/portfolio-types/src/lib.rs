pub mod claim;
pub mod dashboard;
pub mod document;
pub mod enrichment;
pub mod property;
pub mod renewal;

pub use claim::{Claim, ClaimStatus};
pub use dashboard::{DashboardSummary, ResetResult};
pub use document::{Document, ExtractionStatus, UploadStatus};
pub use enrichment::{
    CarrierResearch, EnrichmentKind, LenderRequirements, MarketIntelligence, PropertyRisk,
    RiskFactor,
};
pub use property::{Address, GapCounts, GeoLocation, HealthGrade, Property};
pub use renewal::{
    AlertConfig, AlertStatus, AlertThreshold, RenewalAlert, RenewalForecast, RenewalMilestone,
    RenewalTimeline,
};

use serde::{Deserialize, Serialize};

/// Severity shared by coverage gaps, renewal alerts and alert thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
