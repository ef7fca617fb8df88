//! Scripted transport for driving page controllers without a browser

use std::cell::RefCell;
use std::collections::HashMap;

use api_client::{ApiClient, ApiRequest, ApiResponse, ClientConfig, HttpMethod, Transport};
use async_trait::async_trait;
use portfolio_engine::fixtures;
use serde_json::{json, Value};

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: HashMap<(HttpMethod, String), ApiResponse>,
    seen: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn route(
        mut self,
        method: HttpMethod,
        path: &str,
        status: u16,
        body: Value,
    ) -> Self {
        self.routes
            .insert((method, path.to_string()), ApiResponse { status, body });
        self
    }

    /// Every read endpoint the pages use, answered from the fixtures
    pub(crate) fn with_fixtures() -> Self {
        let mut transport = Self::default()
            .route(
                HttpMethod::Get,
                "/api/properties",
                200,
                json!({ "items": fixtures::properties() }),
            )
            .route(
                HttpMethod::Get,
                "/api/dashboard/summary",
                200,
                json!(fixtures::dashboard_summary()),
            )
            .route(
                HttpMethod::Get,
                "/api/claims",
                200,
                json!({ "items": fixtures::claims() }),
            )
            .route(
                HttpMethod::Get,
                "/api/renewals/timeline",
                200,
                json!({ "timelines": fixtures::renewal_timelines() }),
            )
            .route(
                HttpMethod::Get,
                "/api/renewals/alerts",
                200,
                json!(fixtures::renewal_alerts()),
            );

        for forecast in fixtures::renewal_forecasts() {
            let path = format!("/api/renewals/forecast/{}", forecast.property_id);
            transport = transport.route(HttpMethod::Get, &path, 200, json!(forecast));
        }
        transport
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.seen.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> api_client::Result<ApiResponse> {
        self.seen.borrow_mut().push(request.clone());
        Ok(self
            .routes
            .get(&(request.method, request.path.clone()))
            .cloned()
            .unwrap_or(ApiResponse {
                status: 404,
                body: json!({"success": false, "error": "Not found"}),
            }))
    }
}

pub(crate) fn fixture_client() -> ApiClient<ScriptedTransport> {
    ApiClient::new(ScriptedTransport::with_fixtures(), ClientConfig::default())
}
