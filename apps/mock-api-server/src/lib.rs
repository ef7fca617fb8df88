//! Mock portfolio API
//!
//! Serves the fixture portfolio on the REST surface the dashboard consumes,
//! so the UI can be developed and tested without the real backend:
//!
//! - Properties, claims, documents (list / get / delete / status update)
//! - Renewal timelines, forecasts, alerts and alert configs
//! - Dashboard summary and admin reset
//! - Canned enrichment answers
//!
//! State lives in memory and is lost on restart.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod state;

pub use error::ServerError;
pub use state::{AppState, Envelope, MockDb};

/// Full router with middleware
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn routes() -> Router<AppState> {
    use api::*;

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Properties
        .route("/api/properties", get(handle_list_properties))
        .route(
            "/api/properties/:id",
            get(handle_get_property).delete(handle_delete_property),
        )
        // Claims
        .route("/api/claims", get(handle_list_claims))
        .route("/api/claims/:id", get(handle_get_claim))
        .route("/api/claims/:id/status", post(handle_update_claim_status))
        // Renewals
        .route("/api/renewals/timeline", get(handle_list_timelines))
        .route(
            "/api/renewals/forecast/:property_id",
            get(handle_get_forecast),
        )
        .route("/api/renewals/alerts", get(handle_list_alerts))
        .route(
            "/api/renewals/alerts/:id/acknowledge",
            post(handle_acknowledge_alert),
        )
        .route("/api/renewals/alerts/:id/resolve", post(handle_resolve_alert))
        .route(
            "/api/renewals/alert-config/:property_id",
            get(handle_get_alert_config).put(handle_save_alert_config),
        )
        // Documents
        .route("/api/documents", get(handle_list_documents))
        .route("/api/documents/:id", get(handle_get_document))
        // Dashboard and admin
        .route("/api/dashboard/summary", get(handle_dashboard_summary))
        .route("/api/admin/reset", post(handle_reset))
        // Enrichment
        .route("/api/enrichment/carrier", post(handle_carrier_research))
        .route(
            "/api/enrichment/lender-requirements",
            post(handle_lender_requirements),
        )
        .route(
            "/api/enrichment/property-risk/:property_id",
            post(handle_property_risk),
        )
        .route(
            "/api/enrichment/market-intelligence",
            post(handle_market_intelligence),
        )
}
