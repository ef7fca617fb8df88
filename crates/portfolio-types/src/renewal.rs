//! Renewal timelines, threshold alerts, premium forecasts and alert configuration

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Severity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalMilestone {
    pub name: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
}

/// Per-property projection toward the next policy renewal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalTimeline {
    pub property_id: String,
    #[serde(default)]
    pub property_name: String,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    pub days_until_expiration: i64,
    #[serde(default)]
    pub current_premium: f64,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub active_alerts: u32,
    #[serde(default)]
    pub milestones: Vec<RenewalMilestone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Acknowledged,
    Resolved,
    Expired,
}

impl AlertStatus {
    /// Alerts still demanding attention
    pub fn is_active(&self) -> bool {
        matches!(self, AlertStatus::Pending | AlertStatus::Acknowledged)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalAlert {
    pub id: String,
    pub property_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub trigger_days: i64,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolution_notes: Option<String>,
}

/// Backend-supplied premium projection. The numbers are opaque here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalForecast {
    pub property_id: String,
    #[serde(default)]
    pub current_premium: f64,
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    #[serde(default)]
    pub change_pct: f64,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThreshold {
    pub days_before_expiration: u32,
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub notify_email: bool,
    #[serde(default = "default_true")]
    pub notify_dashboard: bool,
}

fn default_true() -> bool {
    true
}

/// Per-property notification thresholds, saved wholesale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub property_id: String,
    #[serde(default)]
    pub thresholds: Vec<AlertThreshold>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl AlertConfig {
    /// The 90/60/30 day ladder used when a property has no saved config
    pub fn default_for(property_id: &str) -> Self {
        Self {
            property_id: property_id.to_string(),
            thresholds: vec![
                AlertThreshold {
                    days_before_expiration: 90,
                    severity: Severity::Info,
                    notify_email: true,
                    notify_dashboard: true,
                },
                AlertThreshold {
                    days_before_expiration: 60,
                    severity: Severity::Warning,
                    notify_email: true,
                    notify_dashboard: true,
                },
                AlertThreshold {
                    days_before_expiration: 30,
                    severity: Severity::Critical,
                    notify_email: true,
                    notify_dashboard: true,
                },
            ],
            enabled: true,
        }
    }
}
