//! Renewal aggregation over fetched timelines and forecasts
//!
//! Urgency buckets: `<= 30` days critical (overdue negatives included),
//! `31..=60` warning, `> 60` info. Forecast numbers are taken as given.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use portfolio_types::{
    AlertConfig, AlertStatus, RenewalAlert, RenewalForecast, RenewalTimeline, Severity,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;

pub const CRITICAL_DAYS: i64 = 30;
pub const WARNING_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBucket {
    Critical,
    Warning,
    Info,
}

impl UrgencyBucket {
    pub fn for_days(days: i64) -> Self {
        if days <= CRITICAL_DAYS {
            UrgencyBucket::Critical
        } else if days <= WARNING_DAYS {
            UrgencyBucket::Warning
        } else {
            UrgencyBucket::Info
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            UrgencyBucket::Critical => Severity::Critical,
            UrgencyBucket::Warning => Severity::Warning,
            UrgencyBucket::Info => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStatus {
    OnTrack,
    NeedsAttention,
    Overdue,
}

impl RenewalStatus {
    pub fn for_timeline(timeline: &RenewalTimeline) -> Self {
        if timeline.active_alerts == 0 {
            return RenewalStatus::OnTrack;
        }

        match UrgencyBucket::for_days(timeline.days_until_expiration) {
            UrgencyBucket::Critical => RenewalStatus::Overdue,
            UrgencyBucket::Warning | UrgencyBucket::Info => RenewalStatus::NeedsAttention,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrgencyCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl UrgencyCounts {
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub on_track: usize,
    pub needs_attention: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenewalSummary {
    pub total: usize,
    pub by_urgency: UrgencyCounts,
    pub by_status: StatusCounts,
    /// Mean of `change_pct` across properties that have a forecast
    pub average_change_pct: Option<f64>,
    /// Sum of mid-point forecasts
    pub projected_total_premium: f64,
    pub current_total_premium: f64,
    pub forecast_count: usize,
}

/// One timeline row as the renewals page shows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalRow {
    pub timeline: RenewalTimeline,
    pub urgency: UrgencyBucket,
    pub status: RenewalStatus,
    pub forecast: Option<RenewalForecast>,
}

pub fn summarize_renewals(
    timelines: &[RenewalTimeline],
    forecasts: &HashMap<String, RenewalForecast>,
) -> RenewalSummary {
    let mut summary = RenewalSummary {
        total: timelines.len(),
        ..Default::default()
    };

    let mut change_sum = 0.0;

    for timeline in timelines {
        match UrgencyBucket::for_days(timeline.days_until_expiration) {
            UrgencyBucket::Critical => summary.by_urgency.critical += 1,
            UrgencyBucket::Warning => summary.by_urgency.warning += 1,
            UrgencyBucket::Info => summary.by_urgency.info += 1,
        }

        match RenewalStatus::for_timeline(timeline) {
            RenewalStatus::OnTrack => summary.by_status.on_track += 1,
            RenewalStatus::NeedsAttention => summary.by_status.needs_attention += 1,
            RenewalStatus::Overdue => summary.by_status.overdue += 1,
        }

        summary.current_total_premium += timeline.current_premium;

        if let Some(forecast) = forecasts.get(&timeline.property_id) {
            summary.forecast_count += 1;
            summary.projected_total_premium += forecast.mid;
            change_sum += forecast.change_pct;
        }
    }

    if summary.forecast_count > 0 {
        summary.average_change_pct = Some(change_sum / summary.forecast_count as f64);
    }

    debug!(
        total = summary.total,
        forecasts = summary.forecast_count,
        "Summarized renewals"
    );
    summary
}

/// Rows ordered by days until expiration, soonest first (stable on ties)
pub fn renewal_rows(
    timelines: &[RenewalTimeline],
    forecasts: &HashMap<String, RenewalForecast>,
) -> Vec<RenewalRow> {
    let mut rows: Vec<RenewalRow> = timelines
        .iter()
        .map(|t| RenewalRow {
            timeline: t.clone(),
            urgency: UrgencyBucket::for_days(t.days_until_expiration),
            status: RenewalStatus::for_timeline(t),
            forecast: forecasts.get(&t.property_id).cloned(),
        })
        .collect();
    rows.sort_by_key(|r| r.timeline.days_until_expiration);
    rows
}

pub fn alerts_with_status(alerts: &[RenewalAlert], status: AlertStatus) -> Vec<&RenewalAlert> {
    alerts.iter().filter(|a| a.status == status).collect()
}

/// Record a successful acknowledge call locally
pub fn apply_acknowledge(alert: &mut RenewalAlert, at: DateTime<Utc>) -> Result<(), EngineError> {
    match alert.status {
        AlertStatus::Pending => {
            alert.status = AlertStatus::Acknowledged;
            alert.acknowledged_at = Some(at);
            Ok(())
        }
        other => Err(EngineError::InvalidTransition {
            id: alert.id.clone(),
            from: format!("{:?}", other).to_lowercase(),
            action: "acknowledge",
        }),
    }
}

/// Record a successful resolve call locally
pub fn apply_resolve(
    alert: &mut RenewalAlert,
    notes: Option<String>,
    at: DateTime<Utc>,
) -> Result<(), EngineError> {
    if !alert.status.is_active() {
        return Err(EngineError::InvalidTransition {
            id: alert.id.clone(),
            from: format!("{:?}", alert.status).to_lowercase(),
            action: "resolve",
        });
    }

    alert.status = AlertStatus::Resolved;
    alert.resolved_at = Some(at);
    alert.resolution_notes = notes;
    Ok(())
}

/// Check an alert config before saving and order thresholds furthest-out first
pub fn normalize_alert_config(mut config: AlertConfig) -> Result<AlertConfig, EngineError> {
    if config.property_id.trim().is_empty() {
        return Err(EngineError::InvalidAlertConfig(
            "property_id is required".to_string(),
        ));
    }

    for threshold in &config.thresholds {
        if threshold.days_before_expiration == 0 {
            return Err(EngineError::InvalidAlertConfig(
                "threshold days must be greater than zero".to_string(),
            ));
        }
        if !threshold.notify_email && !threshold.notify_dashboard {
            return Err(EngineError::InvalidAlertConfig(format!(
                "threshold at {} days has no notification channel",
                threshold.days_before_expiration
            )));
        }
    }

    config
        .thresholds
        .sort_by(|a, b| b.days_before_expiration.cmp(&a.days_before_expiration));

    if let Some(dup) = config
        .thresholds
        .windows(2)
        .find(|w| w[0].days_before_expiration == w[1].days_before_expiration)
    {
        return Err(EngineError::InvalidAlertConfig(format!(
            "duplicate threshold at {} days",
            dup[0].days_before_expiration
        )));
    }

    Ok(config)
}
