//! Typed access to the portfolio REST API
//!
//! Endpoints are grouped the way the pages use them (`client.claims().list()`).
//! List loaders go through [`normalize_list`] and the configured
//! [`DataPolicy`], so callers always get a flat list tagged with where it
//! came from.

use std::collections::HashMap;

use futures::future::join_all;
use portfolio_engine::{fixtures, normalize_alert_config, StatusChange};
use portfolio_types::{
    AlertConfig, CarrierResearch, Claim, ClaimStatus, DashboardSummary, Document,
    LenderRequirements, MarketIntelligence, Property, PropertyRisk, RenewalAlert,
    RenewalForecast, RenewalTimeline, ResetResult,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, DataPolicy};
use crate::envelope::normalize_list;
use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, ApiResponse, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Live,
    Fixture,
}

/// Loader output tagged with its source so pages can flag demo data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loaded<T> {
    pub data: T,
    pub origin: DataOrigin,
}

impl<T> Loaded<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Live,
        }
    }

    pub fn fixture(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Fixture,
        }
    }

    pub fn is_fixture(&self) -> bool {
        self.origin == DataOrigin::Fixture
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            data: f(self.data),
            origin: self.origin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertiesPageData {
    pub properties: Loaded<Vec<Property>>,
    pub summary: Loaded<DashboardSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalsPageData {
    pub timelines: Loaded<Vec<RenewalTimeline>>,
    /// Keyed by property id. Properties whose forecast failed are absent.
    pub forecasts: HashMap<String, RenewalForecast>,
    pub alerts: Loaded<Vec<RenewalAlert>>,
}

pub struct ApiClient<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn properties(&self) -> PropertiesApi<'_, T> {
        PropertiesApi { client: self }
    }

    pub fn claims(&self) -> ClaimsApi<'_, T> {
        ClaimsApi { client: self }
    }

    pub fn renewals(&self) -> RenewalsApi<'_, T> {
        RenewalsApi { client: self }
    }

    pub fn documents(&self) -> DocumentsApi<'_, T> {
        DocumentsApi { client: self }
    }

    pub fn dashboard(&self) -> DashboardApi<'_, T> {
        DashboardApi { client: self }
    }

    pub fn admin(&self) -> AdminApi<'_, T> {
        AdminApi { client: self }
    }

    pub fn enrichment(&self) -> EnrichmentApi<'_, T> {
        EnrichmentApi { client: self }
    }

    /// Properties and the dashboard summary, fetched together
    pub async fn load_properties_page(&self) -> Result<PropertiesPageData> {
        let (properties_api, dashboard_api) = (self.properties(), self.dashboard());
        let (properties, summary) =
            futures::join!(properties_api.list(), dashboard_api.summary());
        Ok(PropertiesPageData {
            properties: properties?,
            summary: summary?,
        })
    }

    /// Timelines first, then every forecast and the alert list in parallel
    pub async fn load_renewals_page(&self) -> Result<RenewalsPageData> {
        let renewals = self.renewals();
        let timelines = renewals.timelines().await?;

        let forecasts = async {
            if timelines.is_fixture() {
                fixtures::renewal_forecasts()
                    .into_iter()
                    .map(|f| (f.property_id.clone(), f))
                    .collect::<HashMap<_, _>>()
            } else {
                renewals.forecasts_for(&timelines.data).await
            }
        };
        let (forecasts, alerts) = futures::join!(forecasts, renewals.alerts());

        Ok(RenewalsPageData {
            timelines,
            forecasts,
            alerts: alerts?,
        })
    }

    async fn request(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        request.path = self.config.url(&request.path);
        debug!(method = request.method.as_str(), path = %request.path, "api request");
        self.transport.send(request).await?.error_for_status()
    }

    async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let response = self.request(request).await?;
        Ok(serde_json::from_value(response.body)?)
    }

    async fn fetch_unit(&self, request: ApiRequest) -> Result<()> {
        self.request(request).await.map(|_| ())
    }

    async fn fetch_list<R: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<Vec<R>> {
        let response = self.request(ApiRequest::get(path)).await?;
        normalize_list(response.body, resource)
    }

    async fn load_list<R: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
        fixture: fn() -> Vec<R>,
    ) -> Result<Loaded<Vec<R>>> {
        let outcome = self.fetch_list(path, resource).await;
        match (self.config.data_policy, outcome) {
            (_, Ok(data)) if !data.is_empty() => Ok(Loaded::live(data)),
            (DataPolicy::Live, outcome) => outcome.map(Loaded::live),
            (DataPolicy::FallbackToFixtures, Ok(_)) => {
                warn!(resource, "Empty response, serving fixtures");
                Ok(Loaded::fixture(fixture()))
            }
            (DataPolicy::FallbackToFixtures, Err(err)) => {
                warn!(resource, error = %err, "Request failed, serving fixtures");
                Ok(Loaded::fixture(fixture()))
            }
        }
    }
}

/// Ids are spliced into paths, so refuse anything that would change the route
fn segment(id: &str) -> Result<&str> {
    if id.trim().is_empty() || id.contains(|c: char| matches!(c, '/' | '?' | '#')) {
        return Err(ClientError::InvalidRequest(format!("invalid id {:?}", id)));
    }
    Ok(id)
}

fn require_query<'a>(value: &'a str, label: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::InvalidRequest(format!("{} is required", label)));
    }
    Ok(value)
}

pub struct PropertiesApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<T: Transport> PropertiesApi<'_, T> {
    pub async fn list(&self) -> Result<Loaded<Vec<Property>>> {
        self.client
            .load_list("/properties", "properties", fixtures::properties)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Property> {
        let path = format!("/properties/{}", segment(id)?);
        self.client.fetch(ApiRequest::get(path)).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/properties/{}", segment(id)?);
        self.client.fetch_unit(ApiRequest::delete(path)).await?;
        info!(property_id = id, "Deleted property");
        Ok(())
    }
}

pub struct ClaimsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<T: Transport> ClaimsApi<'_, T> {
    pub async fn list(&self) -> Result<Loaded<Vec<Claim>>> {
        self.client
            .load_list("/claims", "claims", fixtures::claims)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Claim> {
        let path = format!("/claims/{}", segment(id)?);
        self.client.fetch(ApiRequest::get(path)).await
    }

    pub async fn update_status(&self, id: &str, status: ClaimStatus) -> Result<Claim> {
        if !status.is_column() {
            return Err(ClientError::InvalidRequest(format!(
                "cannot set claim status to {}",
                status
            )));
        }
        let path = format!("/claims/{}/status", segment(id)?);
        let request = ApiRequest::post(path).json(&json!({ "status": status }))?;
        let claim = self.client.fetch(request).await?;
        info!(claim_id = id, status = %status, "Updated claim status");
        Ok(claim)
    }

    /// Write a board move through when `persist_kanban_moves` is on.
    /// `None` means the move stays local.
    pub async fn persist_move(&self, change: &StatusChange) -> Result<Option<Claim>> {
        if !self.client.config.persist_kanban_moves {
            debug!(claim_id = %change.claim_id, "Kanban move kept local");
            return Ok(None);
        }
        self.update_status(&change.claim_id, change.to).await.map(Some)
    }
}

pub struct RenewalsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<T: Transport> RenewalsApi<'_, T> {
    pub async fn timelines(&self) -> Result<Loaded<Vec<RenewalTimeline>>> {
        self.client
            .load_list("/renewals/timeline", "timelines", fixtures::renewal_timelines)
            .await
    }

    pub async fn forecast(&self, property_id: &str) -> Result<RenewalForecast> {
        let path = format!("/renewals/forecast/{}", segment(property_id)?);
        self.client.fetch(ApiRequest::get(path)).await
    }

    /// One request per timeline, all in flight together. A failed forecast
    /// leaves its property out of the map.
    pub async fn forecasts_for(
        &self,
        timelines: &[RenewalTimeline],
    ) -> HashMap<String, RenewalForecast> {
        let requests = timelines.iter().map(|t| async move {
            (t.property_id.as_str(), self.forecast(&t.property_id).await)
        });

        let mut forecasts = HashMap::new();
        for (property_id, outcome) in join_all(requests).await {
            match outcome {
                Ok(forecast) => {
                    forecasts.insert(property_id.to_string(), forecast);
                }
                Err(err) => warn!(property_id, error = %err, "Forecast unavailable, omitting"),
            }
        }
        forecasts
    }

    pub async fn alerts(&self) -> Result<Loaded<Vec<RenewalAlert>>> {
        self.client
            .load_list("/renewals/alerts", "alerts", fixtures::renewal_alerts)
            .await
    }

    pub async fn acknowledge_alert(&self, id: &str) -> Result<RenewalAlert> {
        let path = format!("/renewals/alerts/{}/acknowledge", segment(id)?);
        let alert = self.client.fetch(ApiRequest::post(path)).await?;
        info!(alert_id = id, "Acknowledged alert");
        Ok(alert)
    }

    pub async fn resolve_alert(&self, id: &str, notes: Option<&str>) -> Result<RenewalAlert> {
        let path = format!("/renewals/alerts/{}/resolve", segment(id)?);
        let request = ApiRequest::post(path).json(&json!({ "notes": notes }))?;
        let alert = self.client.fetch(request).await?;
        info!(alert_id = id, "Resolved alert");
        Ok(alert)
    }

    /// A property without a saved config gets the default 90/60/30 ladder
    pub async fn alert_config(&self, property_id: &str) -> Result<AlertConfig> {
        let path = format!("/renewals/alert-config/{}", segment(property_id)?);
        match self.client.fetch::<AlertConfig>(ApiRequest::get(path)).await {
            Err(err) if err.is_not_found() => Ok(AlertConfig::default_for(property_id)),
            other => other,
        }
    }

    /// Validated and normalized before it leaves the client
    pub async fn save_alert_config(&self, config: &AlertConfig) -> Result<AlertConfig> {
        let config = normalize_alert_config(config.clone())?;
        let path = format!("/renewals/alert-config/{}", segment(&config.property_id)?);
        let request = ApiRequest::put(path).json(&config)?;
        let saved = self.client.fetch(request).await?;
        info!(
            property_id = %config.property_id,
            thresholds = config.thresholds.len(),
            "Saved alert config"
        );
        Ok(saved)
    }
}

pub struct DocumentsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<T: Transport> DocumentsApi<'_, T> {
    pub async fn list(&self) -> Result<Loaded<Vec<Document>>> {
        self.client
            .load_list("/documents", "documents", fixtures::documents)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Document> {
        let path = format!("/documents/{}", segment(id)?);
        self.client.fetch(ApiRequest::get(path)).await
    }
}

pub struct DashboardApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<T: Transport> DashboardApi<'_, T> {
    pub async fn summary(&self) -> Result<Loaded<DashboardSummary>> {
        match self.client.fetch(ApiRequest::get("/dashboard/summary")).await {
            Ok(summary) => Ok(Loaded::live(summary)),
            Err(err) if self.client.config.data_policy == DataPolicy::FallbackToFixtures => {
                warn!(error = %err, "Dashboard summary failed, serving fixtures");
                Ok(Loaded::fixture(fixtures::dashboard_summary()))
            }
            Err(err) => Err(err),
        }
    }
}

pub struct AdminApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<T: Transport> AdminApi<'_, T> {
    pub async fn reset_all_data(&self) -> Result<ResetResult> {
        let result: ResetResult = self.client.fetch(ApiRequest::post("/admin/reset")).await?;
        info!(
            rows = result.total_rows(),
            vectors = result.vector_records_deleted,
            "Reset all data"
        );
        Ok(result)
    }
}

/// One request per call. These are slow (tens of seconds); there is no
/// polling or cancellation.
pub struct EnrichmentApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<T: Transport> EnrichmentApi<'_, T> {
    pub async fn carrier_research(&self, carrier_name: &str) -> Result<CarrierResearch> {
        let carrier_name = require_query(carrier_name, "carrier name")?;
        let request =
            ApiRequest::post("/enrichment/carrier").json(&json!({ "carrier_name": carrier_name }))?;
        self.client.fetch(request).await
    }

    pub async fn lender_requirements(&self, lender_name: &str) -> Result<LenderRequirements> {
        let lender_name = require_query(lender_name, "lender name")?;
        let request = ApiRequest::post("/enrichment/lender-requirements")
            .json(&json!({ "lender_name": lender_name }))?;
        self.client.fetch(request).await
    }

    pub async fn property_risk(&self, property_id: &str) -> Result<PropertyRisk> {
        let path = format!("/enrichment/property-risk/{}", segment(property_id)?);
        self.client.fetch(ApiRequest::post(path)).await
    }

    pub async fn market_intelligence(&self, market: &str) -> Result<MarketIntelligence> {
        let market = require_query(market, "market")?;
        let request = ApiRequest::post("/enrichment/market-intelligence")
            .json(&json!({ "market": market }))?;
        self.client.fetch(request).await
    }
}
