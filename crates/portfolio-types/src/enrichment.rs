//! AI/web-research enrichment results
//!
//! Each card asks the enrichment service one question and gets one of these
//! back. Field sets follow what the cards render; anything the service adds
//! beyond them is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentKind {
    CarrierResearch,
    LenderRequirements,
    PropertyRisk,
    MarketIntelligence,
}

impl EnrichmentKind {
    pub fn title(&self) -> &'static str {
        match self {
            EnrichmentKind::CarrierResearch => "Carrier Research",
            EnrichmentKind::LenderRequirements => "Lender Requirements",
            EnrichmentKind::PropertyRisk => "Property Risk",
            EnrichmentKind::MarketIntelligence => "Market Intelligence",
        }
    }

    /// What the search box asks for
    pub fn query_label(&self) -> &'static str {
        match self {
            EnrichmentKind::CarrierResearch => "Carrier name",
            EnrichmentKind::LenderRequirements => "Lender name",
            EnrichmentKind::PropertyRisk => "Property",
            EnrichmentKind::MarketIntelligence => "Market or region",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "carrier_research" | "carrier" => Some(EnrichmentKind::CarrierResearch),
            "lender_requirements" | "lender" => Some(EnrichmentKind::LenderRequirements),
            "property_risk" | "risk" => Some(EnrichmentKind::PropertyRisk),
            "market_intelligence" | "market" => Some(EnrichmentKind::MarketIntelligence),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierResearch {
    pub carrier_name: String,
    #[serde(default)]
    pub am_best_rating: Option<String>,
    #[serde(default)]
    pub financial_strength: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub recent_news: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenderRequirements {
    pub lender_name: String,
    #[serde(default)]
    pub minimum_carrier_rating: Option<String>,
    #[serde(default)]
    pub max_deductible_pct: Option<f64>,
    #[serde(default)]
    pub required_coverages: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRisk {
    pub property_id: String,
    /// 0-100, higher is riskier
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub flood_zone: Option<String>,
    #[serde(default)]
    pub factors: Vec<RiskFactor>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIntelligence {
    pub market: String,
    #[serde(default)]
    pub rate_trend_pct: Option<f64>,
    #[serde(default)]
    pub capacity_outlook: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}
