//! Property records and the health grade derived from their score

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Coverage gap counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapCounts {
    #[serde(default)]
    pub critical: u32,
    #[serde(default)]
    pub warning: u32,
    #[serde(default)]
    pub info: u32,
}

impl GapCounts {
    pub fn total(&self) -> u32 {
        self.critical + self.warning + self.info
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub geolocation: Option<GeoLocation>,
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub unit_count: u32,
    #[serde(default)]
    pub building_count: u32,
    #[serde(default)]
    pub total_insured_value: f64,
    #[serde(default)]
    pub total_premium: f64,
    /// 0-100
    #[serde(default)]
    pub health_score: f64,
    #[serde(default)]
    pub gaps: GapCounts,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub days_until_expiration: Option<i64>,
    #[serde(default)]
    pub compliance_status: String,
    #[serde(default)]
    pub completeness_pct: f64,
}

impl Property {
    pub fn health_grade(&self) -> HealthGrade {
        HealthGrade::from_score(self.health_score)
    }
}

/// Letter grade banded at 90/80/70/60
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthGrade {
    A,
    B,
    C,
    D,
    F,
}

impl HealthGrade {
    pub const ALL: [HealthGrade; 5] = [
        HealthGrade::A,
        HealthGrade::B,
        HealthGrade::C,
        HealthGrade::D,
        HealthGrade::F,
    ];

    /// Scores outside 0-100 are clamped; NaN grades as F
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(0.0, 100.0);
        if score >= 90.0 {
            HealthGrade::A
        } else if score >= 80.0 {
            HealthGrade::B
        } else if score >= 70.0 {
            HealthGrade::C
        } else if score >= 60.0 {
            HealthGrade::D
        } else {
            HealthGrade::F
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(HealthGrade::A),
            "B" => Some(HealthGrade::B),
            "C" => Some(HealthGrade::C),
            "D" => Some(HealthGrade::D),
            "F" => Some(HealthGrade::F),
            _ => None,
        }
    }
}

impl std::fmt::Display for HealthGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            HealthGrade::A => "A",
            HealthGrade::B => "B",
            HealthGrade::C => "C",
            HealthGrade::D => "D",
            HealthGrade::F => "F",
        };
        write!(f, "{}", letter)
    }
}
