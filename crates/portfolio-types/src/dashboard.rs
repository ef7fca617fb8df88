use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Portfolio-wide numbers shown above the properties list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub property_count: u32,
    #[serde(default)]
    pub total_insured_value: f64,
    #[serde(default)]
    pub total_premium: f64,
    #[serde(default)]
    pub open_claims: u32,
    #[serde(default)]
    pub pending_alerts: u32,
    #[serde(default)]
    pub average_health_score: f64,
    #[serde(default)]
    pub expiring_30_days: u32,
    #[serde(default)]
    pub expiring_60_days: u32,
    #[serde(default)]
    pub expiring_90_days: u32,
}

/// Outcome of the admin "reset all data" action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResult {
    /// Table name to number of rows removed
    #[serde(default)]
    pub tables_cleared: BTreeMap<String, u64>,
    #[serde(default)]
    pub vector_records_deleted: u64,
}

impl ResetResult {
    pub fn total_rows(&self) -> u64 {
        self.tables_cleared.values().sum()
    }
}
