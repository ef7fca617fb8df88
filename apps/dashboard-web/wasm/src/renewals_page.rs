//! Renewals page: timeline rows, roll-up cards, the alert inbox and
//! per-property alert thresholds

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use api_client::{ApiClient, ClientError, DataOrigin, RenewalsPageData, Transport};
use chrono::Utc;
use js_sys::Promise;
use portfolio_engine::{
    apply_acknowledge, apply_resolve, renewal_rows, summarize_renewals, LoadTicket, RenewalRow,
    RenewalSummary,
};
use portfolio_types::{AlertConfig, AlertStatus, RenewalAlert, RenewalForecast, RenewalTimeline};
use serde::Serialize;
use tracing::{debug, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app_state::SharedClient;
use crate::bridge::{from_js, js_error, to_js};
use crate::page::{combined_origin, LoadState, PageLoad};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertAction {
    Acknowledge,
    Resolve,
}

#[derive(Debug, Default)]
pub struct RenewalsPageState {
    timelines: Vec<RenewalTimeline>,
    forecasts: HashMap<String, RenewalForecast>,
    alerts: Vec<RenewalAlert>,
    alert_filter: Option<AlertStatus>,
    alert_config: Option<AlertConfig>,
    load: PageLoad,
}

impl RenewalsPageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.load.begin()
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<RenewalsPageData, ClientError>,
    ) -> bool {
        let outcome = outcome.map(|page| {
            let origin = combined_origin(&[page.timelines.origin, page.alerts.origin]);
            ((page.timelines.data, page.forecasts, page.alerts.data), origin)
        });

        match self.load.finish(ticket, outcome) {
            Some((timelines, forecasts, alerts)) => {
                self.timelines = timelines;
                self.forecasts = forecasts;
                self.alerts = alerts;
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> RenewalSummary {
        summarize_renewals(&self.timelines, &self.forecasts)
    }

    pub fn rows(&self) -> Vec<RenewalRow> {
        renewal_rows(&self.timelines, &self.forecasts)
    }

    pub fn set_alert_filter(&mut self, status: Option<AlertStatus>) {
        self.alert_filter = status;
    }

    /// Alerts under the current filter, newest first
    pub fn alerts(&self) -> Vec<RenewalAlert> {
        let mut alerts: Vec<RenewalAlert> = self
            .alerts
            .iter()
            .filter(|a| self.alert_filter.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts
    }

    pub fn alert(&self, id: &str) -> Option<&RenewalAlert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn alert_counts(&self) -> HashMap<AlertStatus, usize> {
        let mut counts = HashMap::new();
        for alert in &self.alerts {
            *counts.entry(alert.status).or_insert(0) += 1;
        }
        counts
    }

    pub fn alert_config(&self) -> Option<&AlertConfig> {
        self.alert_config.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        self.load.state()
    }

    pub fn unmount(&mut self) {
        self.load.unmount();
    }

    fn is_fixture_backed(&self) -> bool {
        matches!(
            self.load.state(),
            LoadState::Ready {
                origin: DataOrigin::Fixture
            }
        )
    }

    /// Check the transition against the local copy before any request goes out
    fn preview(
        &self,
        id: &str,
        action: AlertAction,
        notes: Option<&str>,
    ) -> Result<RenewalAlert, ClientError> {
        let mut alert = self
            .alert(id)
            .cloned()
            .ok_or_else(|| ClientError::InvalidRequest(format!("unknown alert {}", id)))?;

        let now = Utc::now();
        match action {
            AlertAction::Acknowledge => apply_acknowledge(&mut alert, now)?,
            AlertAction::Resolve => apply_resolve(&mut alert, notes.map(str::to_string), now)?,
        }
        Ok(alert)
    }

    /// Swap in the updated alert and keep the timeline's active count in step
    fn replace_alert(&mut self, updated: RenewalAlert) {
        let Some(slot) = self.alerts.iter_mut().find(|a| a.id == updated.id) else {
            return;
        };

        let was_active = slot.status.is_active();
        let is_active = updated.status.is_active();
        let property_id = updated.property_id.clone();
        *slot = updated;

        if was_active && !is_active {
            if let Some(timeline) = self
                .timelines
                .iter_mut()
                .find(|t| t.property_id == property_id)
            {
                timeline.active_alerts = timeline.active_alerts.saturating_sub(1);
            }
        }
    }
}

async fn run_alert_action<T: Transport>(
    page: &RefCell<RenewalsPageState>,
    client: &ApiClient<T>,
    id: &str,
    action: AlertAction,
    notes: Option<&str>,
) -> Result<RenewalAlert, ClientError> {
    let (preview, local_only) = {
        let state = page.borrow();
        (state.preview(id, action, notes)?, state.is_fixture_backed())
    };

    let updated = if local_only {
        debug!(alert_id = id, "Fixture data, applying alert action locally");
        preview
    } else {
        match action {
            AlertAction::Acknowledge => client.renewals().acknowledge_alert(id).await?,
            AlertAction::Resolve => client.renewals().resolve_alert(id, notes).await?,
        }
    };

    page.borrow_mut().replace_alert(updated.clone());
    Ok(updated)
}

pub async fn load_renewals<T: Transport>(
    page: &RefCell<RenewalsPageState>,
    client: &ApiClient<T>,
) -> bool {
    let ticket = page.borrow_mut().begin_load();
    let outcome = client.load_renewals_page().await;
    page.borrow_mut().finish_load(ticket, outcome)
}

pub async fn acknowledge_alert<T: Transport>(
    page: &RefCell<RenewalsPageState>,
    client: &ApiClient<T>,
    id: &str,
) -> Result<RenewalAlert, ClientError> {
    run_alert_action(page, client, id, AlertAction::Acknowledge, None).await
}

pub async fn resolve_alert<T: Transport>(
    page: &RefCell<RenewalsPageState>,
    client: &ApiClient<T>,
    id: &str,
    notes: Option<&str>,
) -> Result<RenewalAlert, ClientError> {
    run_alert_action(page, client, id, AlertAction::Resolve, notes).await
}

pub async fn load_alert_config<T: Transport>(
    page: &RefCell<RenewalsPageState>,
    client: &ApiClient<T>,
    property_id: &str,
) -> Result<AlertConfig, ClientError> {
    let config = client.renewals().alert_config(property_id).await?;
    page.borrow_mut().alert_config = Some(config.clone());
    Ok(config)
}

pub async fn save_alert_config<T: Transport>(
    page: &RefCell<RenewalsPageState>,
    client: &ApiClient<T>,
    config: &AlertConfig,
) -> Result<AlertConfig, ClientError> {
    let saved = client.renewals().save_alert_config(config).await?;
    info!(property_id = %saved.property_id, "Alert thresholds updated");
    page.borrow_mut().alert_config = Some(saved.clone());
    Ok(saved)
}

#[derive(Serialize)]
struct RenewalsSnapshot<'a> {
    load: &'a LoadState,
    summary: RenewalSummary,
    rows: Vec<RenewalRow>,
    alerts: Vec<RenewalAlert>,
    alert_counts: HashMap<AlertStatus, usize>,
    alert_filter: Option<AlertStatus>,
}

#[wasm_bindgen]
pub struct RenewalsPage {
    state: Rc<RefCell<RenewalsPageState>>,
    client: SharedClient,
}

impl RenewalsPage {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self {
            state: Rc::new(RefCell::new(RenewalsPageState::new())),
            client,
        }
    }
}

#[wasm_bindgen]
impl RenewalsPage {
    pub fn load(&self) -> Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let applied = load_renewals(&state, &client).await;
            Ok(JsValue::from_bool(applied))
        })
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        to_js(&RenewalsSnapshot {
            load: state.load_state(),
            summary: state.summary(),
            rows: state.rows(),
            alerts: state.alerts(),
            alert_counts: state.alert_counts(),
            alert_filter: state.alert_filter,
        })
    }

    /// `"pending"`, `"acknowledged"`, `"resolved"`, `"expired"`, or null for all
    #[wasm_bindgen(js_name = setAlertFilter)]
    pub fn set_alert_filter_js(&self, status: JsValue) -> Result<(), JsValue> {
        let status: Option<AlertStatus> = from_js(status)?;
        self.state.borrow_mut().set_alert_filter(status);
        Ok(())
    }

    #[wasm_bindgen(js_name = acknowledgeAlert)]
    pub fn acknowledge_alert_js(&self, id: String) -> Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let alert = acknowledge_alert(&state, &client, &id)
                .await
                .map_err(js_error)?;
            to_js(&alert)
        })
    }

    #[wasm_bindgen(js_name = resolveAlert)]
    pub fn resolve_alert_js(&self, id: String, notes: Option<String>) -> Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let alert = resolve_alert(&state, &client, &id, notes.as_deref())
                .await
                .map_err(js_error)?;
            to_js(&alert)
        })
    }

    #[wasm_bindgen(js_name = loadAlertConfig)]
    pub fn load_alert_config_js(&self, property_id: String) -> Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let config = load_alert_config(&state, &client, &property_id)
                .await
                .map_err(js_error)?;
            to_js(&config)
        })
    }

    #[wasm_bindgen(js_name = saveAlertConfig)]
    pub fn save_alert_config_js(&self, config: JsValue) -> Result<Promise, JsValue> {
        let config: AlertConfig = from_js(config)?;
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        Ok(future_to_promise(async move {
            let saved = save_alert_config(&state, &client, &config)
                .await
                .map_err(js_error)?;
            to_js(&saved)
        }))
    }

    pub fn unmount(&self) {
        self.state.borrow_mut().unmount();
    }
}
