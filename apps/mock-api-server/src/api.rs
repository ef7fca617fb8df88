//! API handlers for the mock server
//!
//! Same paths and bodies the dashboard client uses against the real backend.
//! List endpoints answer in the envelope chosen at startup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use portfolio_types::{
    AlertConfig, CarrierResearch, Claim, ClaimStatus, DashboardSummary, Document,
    LenderRequirements, MarketIntelligence, Property, PropertyRisk, RenewalAlert,
    RenewalForecast, ResetResult, RiskFactor, Severity,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "mock-api-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================
// Properties
// ============================================================

/// Handler: GET /api/properties
pub async fn handle_list_properties(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(state.envelope.wrap("properties", &db.properties))
}

/// Handler: GET /api/properties/:id
pub async fn handle_get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Property>> {
    let db = state.db.read().await;
    db.property(&id).cloned().map(Json)
}

/// Handler: DELETE /api/properties/:id
pub async fn handle_delete_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    state.db.write().await.delete_property(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Claims
// ============================================================

/// Handler: GET /api/claims
pub async fn handle_list_claims(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(state.envelope.wrap("claims", &db.claims))
}

/// Handler: GET /api/claims/:id
pub async fn handle_get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Claim>> {
    let db = state.db.read().await;
    db.claim(&id).cloned().map(Json)
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ClaimStatus,
}

/// Handler: POST /api/claims/:id/status
pub async fn handle_update_claim_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> ServerResult<Json<Claim>> {
    let claim = state
        .db
        .write()
        .await
        .update_claim_status(&id, update.status)?;
    Ok(Json(claim))
}

// ============================================================
// Renewals
// ============================================================

/// Handler: GET /api/renewals/timeline
pub async fn handle_list_timelines(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(state.envelope.wrap("timelines", &db.timelines))
}

/// Handler: GET /api/renewals/forecast/:property_id
pub async fn handle_get_forecast(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> ServerResult<Json<RenewalForecast>> {
    let db = state.db.read().await;
    db.forecast(&property_id).cloned().map(Json)
}

/// Handler: GET /api/renewals/alerts
pub async fn handle_list_alerts(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(state.envelope.wrap("alerts", &db.alerts))
}

/// Handler: POST /api/renewals/alerts/:id/acknowledge
pub async fn handle_acknowledge_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<RenewalAlert>> {
    let alert = state.db.write().await.acknowledge_alert(&id)?;
    Ok(Json(alert))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Handler: POST /api/renewals/alerts/:id/resolve
pub async fn handle_resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<ResolveRequest>>,
) -> ServerResult<Json<RenewalAlert>> {
    let notes = body
        .and_then(|Json(request)| request.notes)
        .filter(|n| !n.trim().is_empty());
    let alert = state.db.write().await.resolve_alert(&id, notes)?;
    Ok(Json(alert))
}

/// Handler: GET /api/renewals/alert-config/:property_id
pub async fn handle_get_alert_config(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> ServerResult<Json<AlertConfig>> {
    let db = state.db.read().await;
    db.alert_config(&property_id).cloned().map(Json)
}

/// Handler: PUT /api/renewals/alert-config/:property_id
pub async fn handle_save_alert_config(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
    Json(config): Json<AlertConfig>,
) -> ServerResult<Json<AlertConfig>> {
    let saved = state
        .db
        .write()
        .await
        .save_alert_config(&property_id, config)?;
    info!(property_id = %property_id, thresholds = saved.thresholds.len(), "Saved alert config");
    Ok(Json(saved))
}

// ============================================================
// Documents, dashboard, admin
// ============================================================

/// Handler: GET /api/documents
pub async fn handle_list_documents(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(state.envelope.wrap("documents", &db.documents))
}

/// Handler: GET /api/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Document>> {
    let db = state.db.read().await;
    db.document(&id).cloned().map(Json)
}

/// Handler: GET /api/dashboard/summary
pub async fn handle_dashboard_summary(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(state.db.read().await.summary())
}

/// Handler: POST /api/admin/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<ResetResult> {
    Json(state.db.write().await.reset())
}

// ============================================================
// Enrichment (canned answers)
// ============================================================

#[derive(Debug, Deserialize)]
pub struct CarrierQuery {
    pub carrier_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LenderQuery {
    pub lender_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    pub market: String,
}

fn required(value: &str, field: &str) -> ServerResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServerError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Handler: POST /api/enrichment/carrier
pub async fn handle_carrier_research(
    Json(query): Json<CarrierQuery>,
) -> ServerResult<Json<CarrierResearch>> {
    let carrier_name = required(&query.carrier_name, "carrier_name")?;
    debug!(carrier = %carrier_name, "Carrier research");

    Ok(Json(CarrierResearch {
        summary: format!(
            "{} writes admitted coastal property in Florida and has held its rating through the last two hurricane seasons.",
            carrier_name
        ),
        carrier_name,
        am_best_rating: Some("A".to_string()),
        financial_strength: Some("Excellent".to_string()),
        specialties: vec![
            "Habitational".to_string(),
            "Coastal property".to_string(),
        ],
        recent_news: vec!["Expanded Southeast Florida capacity for 2026".to_string()],
        sources: vec!["https://news.ambest.com".to_string()],
        generated_at: Some(Utc::now()),
    }))
}

/// Handler: POST /api/enrichment/lender-requirements
pub async fn handle_lender_requirements(
    Json(query): Json<LenderQuery>,
) -> ServerResult<Json<LenderRequirements>> {
    let lender_name = required(&query.lender_name, "lender_name")?;
    debug!(lender = %lender_name, "Lender requirements");

    Ok(Json(LenderRequirements {
        lender_name,
        minimum_carrier_rating: Some("A- VIII".to_string()),
        max_deductible_pct: Some(5.0),
        required_coverages: vec![
            "Special form property at replacement cost".to_string(),
            "Named windstorm".to_string(),
            "Flood where in SFHA".to_string(),
            "Business income, 12 months".to_string(),
        ],
        notes: vec!["Lender must be named mortgagee and loss payee".to_string()],
        sources: vec!["https://multifamily.fanniemae.com".to_string()],
        generated_at: Some(Utc::now()),
    }))
}

/// Handler: POST /api/enrichment/property-risk/:property_id
pub async fn handle_property_risk(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> ServerResult<Json<PropertyRisk>> {
    let db = state.db.read().await;
    let property = db.property(&property_id)?;
    let coastal = property.address.state == "FL";

    let mut factors = vec![RiskFactor {
        name: "Windstorm".to_string(),
        severity: if coastal {
            Severity::Critical
        } else {
            Severity::Warning
        },
        description: "Located in a hurricane-prone region".to_string(),
    }];
    if property.gaps.critical > 0 {
        factors.push(RiskFactor {
            name: "Coverage gaps".to_string(),
            severity: Severity::Warning,
            description: format!("{} critical coverage gaps open", property.gaps.critical),
        });
    }

    Ok(Json(PropertyRisk {
        property_id: property.id.clone(),
        overall_score: 100.0 - property.health_score.clamp(0.0, 100.0),
        flood_zone: Some(if coastal { "AE" } else { "X" }.to_string()),
        factors,
        sources: vec!["https://msc.fema.gov".to_string()],
        generated_at: Some(Utc::now()),
    }))
}

/// Handler: POST /api/enrichment/market-intelligence
pub async fn handle_market_intelligence(
    Json(query): Json<MarketQuery>,
) -> ServerResult<Json<MarketIntelligence>> {
    let market = required(&query.market, "market")?;
    debug!(market = %market, "Market intelligence");

    Ok(Json(MarketIntelligence {
        market,
        rate_trend_pct: Some(7.5),
        capacity_outlook: Some("Stabilizing after 2024 reinsurance renewals".to_string()),
        highlights: vec![
            "New entrants writing excess layers".to_string(),
            "Wind deductibles holding at 5%".to_string(),
        ],
        sources: vec!["https://www.floir.com".to_string()],
        generated_at: Some(Utc::now()),
    }))
}
