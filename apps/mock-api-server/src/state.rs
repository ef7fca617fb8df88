//! In-memory store seeded from the fixtures

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use portfolio_engine::{apply_acknowledge, apply_resolve, fixtures, normalize_alert_config};
use portfolio_types::{
    AlertConfig, Claim, ClaimStatus, DashboardSummary, Document, Property, RenewalAlert,
    RenewalForecast, RenewalTimeline, ResetResult,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{ServerError, ServerResult};

/// Vector index rows the seeded documents stand for
const SEEDED_VECTOR_RECORDS: u64 = 128;

/// Shape of list responses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Envelope {
    /// `{"items": [...]}`
    #[default]
    Items,
    /// `[...]`
    Bare,
    /// `{"<resource>": [...]}`
    Named,
}

impl Envelope {
    pub fn wrap<T: Serialize>(&self, resource: &str, items: &[T]) -> Value {
        let list = json!(items);
        match self {
            Envelope::Items => json!({ "items": list, "total": items.len() }),
            Envelope::Bare => list,
            Envelope::Named => json!({ resource: list }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockDb {
    pub properties: Vec<Property>,
    pub claims: Vec<Claim>,
    pub timelines: Vec<RenewalTimeline>,
    pub forecasts: HashMap<String, RenewalForecast>,
    pub alerts: Vec<RenewalAlert>,
    pub documents: Vec<Document>,
    pub alert_configs: HashMap<String, AlertConfig>,
    pub vector_records: u64,
}

impl MockDb {
    pub fn seeded() -> Self {
        Self {
            properties: fixtures::properties(),
            claims: fixtures::claims(),
            timelines: fixtures::renewal_timelines(),
            forecasts: fixtures::renewal_forecasts()
                .into_iter()
                .map(|f| (f.property_id.clone(), f))
                .collect(),
            alerts: fixtures::renewal_alerts(),
            documents: fixtures::documents(),
            alert_configs: fixtures::alert_configs()
                .into_iter()
                .map(|c| (c.property_id.clone(), c))
                .collect(),
            vector_records: SEEDED_VECTOR_RECORDS,
        }
    }

    pub fn summary(&self) -> DashboardSummary {
        fixtures::summarize(&self.properties, &self.claims, &self.alerts)
    }

    pub fn property(&self, id: &str) -> ServerResult<&Property> {
        self.properties
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ServerError::not_found("Property", id))
    }

    /// Removes the property and everything hanging off it
    pub fn delete_property(&mut self, id: &str) -> ServerResult<()> {
        let before = self.properties.len();
        self.properties.retain(|p| p.id != id);
        if self.properties.len() == before {
            return Err(ServerError::not_found("Property", id));
        }

        self.claims.retain(|c| c.property_id != id);
        self.timelines.retain(|t| t.property_id != id);
        self.alerts.retain(|a| a.property_id != id);
        self.documents
            .retain(|d| d.property_id.as_deref() != Some(id));
        self.forecasts.remove(id);
        self.alert_configs.remove(id);

        info!(property_id = id, "Deleted property");
        Ok(())
    }

    pub fn claim(&self, id: &str) -> ServerResult<&Claim> {
        self.claims
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ServerError::not_found("Claim", id))
    }

    pub fn update_claim_status(&mut self, id: &str, status: ClaimStatus) -> ServerResult<Claim> {
        if !status.is_column() {
            return Err(ServerError::InvalidRequest(format!(
                "unsupported claim status {}",
                status
            )));
        }
        let claim = self
            .claims
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ServerError::not_found("Claim", id))?;
        claim.status = status;
        info!(claim_id = id, status = %status, "Updated claim status");
        Ok(claim.clone())
    }

    pub fn forecast(&self, property_id: &str) -> ServerResult<&RenewalForecast> {
        self.forecasts
            .get(property_id)
            .ok_or_else(|| ServerError::not_found("Forecast", property_id))
    }

    fn alert_mut(&mut self, id: &str) -> ServerResult<&mut RenewalAlert> {
        self.alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ServerError::not_found("Alert", id))
    }

    pub fn acknowledge_alert(&mut self, id: &str) -> ServerResult<RenewalAlert> {
        let alert = self.alert_mut(id)?;
        apply_acknowledge(alert, Utc::now())?;
        let alert = alert.clone();
        self.refresh_alert_counts();
        Ok(alert)
    }

    pub fn resolve_alert(&mut self, id: &str, notes: Option<String>) -> ServerResult<RenewalAlert> {
        let alert = self.alert_mut(id)?;
        apply_resolve(alert, notes, Utc::now())?;
        let alert = alert.clone();
        self.refresh_alert_counts();
        Ok(alert)
    }

    /// Keep `active_alerts` on timelines in step with alert state
    fn refresh_alert_counts(&mut self) {
        for timeline in &mut self.timelines {
            timeline.active_alerts = self
                .alerts
                .iter()
                .filter(|a| a.property_id == timeline.property_id && a.status.is_active())
                .count() as u32;
        }
    }

    pub fn alert_config(&self, property_id: &str) -> ServerResult<&AlertConfig> {
        self.alert_configs
            .get(property_id)
            .ok_or_else(|| ServerError::not_found("Alert config", property_id))
    }

    pub fn save_alert_config(
        &mut self,
        property_id: &str,
        config: AlertConfig,
    ) -> ServerResult<AlertConfig> {
        if config.property_id != property_id {
            return Err(ServerError::InvalidRequest(format!(
                "config is for {} but was sent to {}",
                config.property_id, property_id
            )));
        }
        self.property(property_id)?;
        let config = normalize_alert_config(config)?;
        self.alert_configs
            .insert(property_id.to_string(), config.clone());
        Ok(config)
    }

    pub fn document(&self, id: &str) -> ServerResult<&Document> {
        self.documents
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ServerError::not_found("Document", id))
    }

    /// Empty every table and report what was removed
    pub fn reset(&mut self) -> ResetResult {
        let tables_cleared = BTreeMap::from([
            ("properties".to_string(), self.properties.len() as u64),
            ("claims".to_string(), self.claims.len() as u64),
            ("renewal_timelines".to_string(), self.timelines.len() as u64),
            ("renewal_forecasts".to_string(), self.forecasts.len() as u64),
            ("renewal_alerts".to_string(), self.alerts.len() as u64),
            ("documents".to_string(), self.documents.len() as u64),
            ("alert_configs".to_string(), self.alert_configs.len() as u64),
        ]);
        let result = ResetResult {
            tables_cleared,
            vector_records_deleted: self.vector_records,
        };

        *self = MockDb::default();
        info!(
            rows = result.total_rows(),
            vectors = result.vector_records_deleted,
            "Reset all data"
        );
        result
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<MockDb>>,
    pub envelope: Envelope,
}

impl AppState {
    pub fn new(db: MockDb, envelope: Envelope) -> Self {
        Self {
            db: Arc::new(RwLock::new(db)),
            envelope,
        }
    }

    pub fn seeded(envelope: Envelope) -> Self {
        Self::new(MockDb::seeded(), envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_types::AlertStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_envelopes() {
        let items = vec![1, 2];
        assert_eq!(Envelope::Bare.wrap("claims", &items), json!([1, 2]));
        assert_eq!(
            Envelope::Items.wrap("claims", &items),
            json!({"items": [1, 2], "total": 2})
        );
        assert_eq!(
            Envelope::Named.wrap("claims", &items),
            json!({"claims": [1, 2]})
        );
    }

    #[test]
    fn test_delete_cascades() {
        let mut db = MockDb::seeded();
        db.delete_property("prop-001").unwrap();
        assert!(db.property("prop-001").is_err());
        assert!(db.claims.iter().all(|c| c.property_id != "prop-001"));
        assert!(db.timelines.iter().all(|t| t.property_id != "prop-001"));
        assert!(db.forecast("prop-001").is_err());
        assert!(matches!(
            db.delete_property("prop-001"),
            Err(ServerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_acknowledge_then_resolve_updates_counts() {
        let mut db = MockDb::seeded();
        let pending = db
            .alerts
            .iter()
            .find(|a| a.status == AlertStatus::Pending)
            .cloned()
            .unwrap();
        let before: u32 = db.timelines.iter().map(|t| t.active_alerts).sum();

        let acked = db.acknowledge_alert(&pending.id).unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert!(matches!(
            db.acknowledge_alert(&pending.id),
            Err(ServerError::Conflict(_))
        ));

        db.resolve_alert(&pending.id, Some("renewed".to_string()))
            .unwrap();
        let after: u32 = db.timelines.iter().map(|t| t.active_alerts).sum();
        assert_eq!(after + 1, before);
    }

    #[test]
    fn test_reset_reports_counts_then_zero() {
        let mut db = MockDb::seeded();
        let first = db.reset();
        assert_eq!(
            first.tables_cleared["properties"],
            fixtures::properties().len() as u64
        );
        assert_eq!(first.vector_records_deleted, SEEDED_VECTOR_RECORDS);

        let second = db.reset();
        assert_eq!(second.total_rows(), 0);
        assert_eq!(second.vector_records_deleted, 0);
        assert_eq!(db.summary(), DashboardSummary::default());
    }

    #[test]
    fn test_save_alert_config_checks_path() {
        let mut db = MockDb::seeded();
        let config = AlertConfig::default_for("prop-002");
        assert!(matches!(
            db.save_alert_config("prop-001", config.clone()),
            Err(ServerError::InvalidRequest(_))
        ));
        assert!(db.save_alert_config("prop-002", config).is_ok());
    }
}
