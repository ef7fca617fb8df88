//! Root object the dashboard shell creates once at startup
//!
//! Holds the client configuration and the contexts that outlive any single
//! page (auth and onboarding), and hands out page controllers that share
//! one API client.

use std::cell::RefCell;
use std::rc::Rc;

use api_client::{ApiClient, ClientConfig, ClientError, Transport};
use js_sys::Promise;
use portfolio_engine::OnboardingContext;
use portfolio_types::ResetResult;
use tracing::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::analytics_page::AnalyticsPage;
use crate::auth::{AuthContext, AuthSession};
use crate::bridge::{from_js, js_error, log, to_js};
use crate::claims_board::ClaimsBoard;
use crate::enrichment_panel::EnrichmentPanel;
use crate::fetch::FetchTransport;
use crate::onboarding::OnboardingWizard;
use crate::properties_page::PropertiesPage;
use crate::renewals_page::RenewalsPage;

pub(crate) type SharedClient = Rc<ApiClient<FetchTransport>>;

/// Clear every table on the backend. Pages reload afterwards.
pub async fn reset_all_data<T: Transport>(
    client: &ApiClient<T>,
) -> Result<ResetResult, ClientError> {
    let result = client.admin().reset_all_data().await?;
    info!(
        rows = result.total_rows(),
        vector_records = result.vector_records_deleted,
        "Portfolio data reset"
    );
    Ok(result)
}

#[wasm_bindgen]
pub struct AppState {
    client: SharedClient,
    auth: Rc<RefCell<AuthContext>>,
    onboarding: Rc<RefCell<OnboardingContext>>,
}

impl AppState {
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            client: Rc::new(ApiClient::new(FetchTransport::new(), config)),
            auth: Rc::new(RefCell::new(AuthContext::new())),
            onboarding: Rc::new(RefCell::new(OnboardingContext::new())),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.client.config()
    }
}

#[wasm_bindgen]
impl AppState {
    /// `config` is `{ base_url, data_policy, persist_kanban_moves }`; any field
    /// may be omitted, and `undefined` means all defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<AppState, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            ClientConfig::default()
        } else {
            from_js(config)?
        };
        log(&format!("Dashboard API at {}", config.base_url));
        Ok(Self::with_config(config))
    }

    #[wasm_bindgen(js_name = fromToml)]
    pub fn from_toml(source: &str) -> Result<AppState, JsValue> {
        let config = ClientConfig::from_toml_str(source).map_err(js_error)?;
        Ok(Self::with_config(config))
    }

    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsValue> {
        to_js(self.config())
    }

    pub fn auth(&self) -> AuthSession {
        AuthSession::new(Rc::clone(&self.auth))
    }

    #[wasm_bindgen(js_name = onboardingWizard)]
    pub fn onboarding_wizard(&self) -> OnboardingWizard {
        OnboardingWizard::new(Rc::clone(&self.onboarding))
    }

    #[wasm_bindgen(js_name = propertiesPage)]
    pub fn properties_page(&self) -> PropertiesPage {
        PropertiesPage::new(Rc::clone(&self.client))
    }

    #[wasm_bindgen(js_name = claimsBoard)]
    pub fn claims_board(&self) -> ClaimsBoard {
        ClaimsBoard::new(Rc::clone(&self.client))
    }

    #[wasm_bindgen(js_name = renewalsPage)]
    pub fn renewals_page(&self) -> RenewalsPage {
        RenewalsPage::new(Rc::clone(&self.client))
    }

    #[wasm_bindgen(js_name = analyticsPage)]
    pub fn analytics_page(&self) -> AnalyticsPage {
        AnalyticsPage::new(Rc::clone(&self.client))
    }

    #[wasm_bindgen(js_name = enrichmentPanel)]
    pub fn enrichment_panel(&self) -> EnrichmentPanel {
        EnrichmentPanel::new(Rc::clone(&self.client))
    }

    /// Resolves to `{ tables_cleared, vector_records_deleted }`
    #[wasm_bindgen(js_name = resetAllData)]
    pub fn reset_all_data_js(&self) -> Promise {
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let result = reset_all_data(&client).await.map_err(js_error)?;
            log(&format!("Reset cleared {} rows", result.total_rows()));
            to_js(&result)
        })
    }
}
