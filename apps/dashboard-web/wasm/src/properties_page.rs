//! Properties list page: filter, sort, totals and delete

use std::cell::RefCell;
use std::rc::Rc;

use api_client::{ApiClient, ClientError, PropertiesPageData, Transport};
use js_sys::Promise;
use portfolio_engine::{LoadTicket, PortfolioStats, PropertyFilter, PropertyView, SortField};
use portfolio_types::{DashboardSummary, Property};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app_state::SharedClient;
use crate::bridge::{from_js, js_error, to_js};
use crate::page::{combined_origin, LoadState, PageLoad};

#[derive(Debug, Default)]
pub struct PropertiesPageState {
    view: PropertyView,
    summary: Option<DashboardSummary>,
    load: PageLoad,
}

impl PropertiesPageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.load.begin()
    }

    /// Returns whether the page took the data
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<PropertiesPageData, ClientError>,
    ) -> bool {
        let outcome = outcome.map(|page| {
            let origin = combined_origin(&[page.properties.origin, page.summary.origin]);
            ((page.properties.data, page.summary.data), origin)
        });

        match self.load.finish(ticket, outcome) {
            Some((properties, summary)) => {
                self.view.set_properties(properties);
                self.summary = Some(summary);
                true
            }
            None => false,
        }
    }

    pub fn set_filter(&mut self, filter: PropertyFilter) {
        self.view.set_filter(filter);
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.view.toggle_sort(field);
    }

    pub fn visible(&mut self) -> Vec<Property> {
        self.view.visible().into_iter().cloned().collect()
    }

    pub fn stats(&mut self) -> PortfolioStats {
        self.view.stats()
    }

    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.summary.as_ref()
    }

    pub fn find(&self, id: &str) -> Option<&Property> {
        self.view.find(id)
    }

    pub fn load_state(&self) -> &LoadState {
        self.load.state()
    }

    pub fn unmount(&mut self) {
        self.load.unmount();
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.view.all().len();
        let remaining: Vec<Property> = self
            .view
            .all()
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect();
        let removed = remaining.len() != before;
        if removed {
            self.view.set_properties(remaining);
        }
        removed
    }
}

pub async fn load_properties<T: Transport>(
    page: &RefCell<PropertiesPageState>,
    client: &ApiClient<T>,
) -> bool {
    let ticket = page.borrow_mut().begin_load();
    let outcome = client.load_properties_page().await;
    page.borrow_mut().finish_load(ticket, outcome)
}

/// Delete on the server, then drop the row locally
pub async fn delete_property<T: Transport>(
    page: &RefCell<PropertiesPageState>,
    client: &ApiClient<T>,
    id: &str,
) -> Result<bool, ClientError> {
    client.properties().delete(id).await?;
    Ok(page.borrow_mut().remove(id))
}

#[derive(Serialize)]
struct PropertiesSnapshot<'a> {
    load: &'a LoadState,
    properties: Vec<Property>,
    stats: PortfolioStats,
    summary: Option<&'a DashboardSummary>,
}

#[wasm_bindgen]
pub struct PropertiesPage {
    state: Rc<RefCell<PropertiesPageState>>,
    client: SharedClient,
}

impl PropertiesPage {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self {
            state: Rc::new(RefCell::new(PropertiesPageState::new())),
            client,
        }
    }
}

#[wasm_bindgen]
impl PropertiesPage {
    /// Resolves to `true` when the response was applied (not superseded)
    pub fn load(&self) -> Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let applied = load_properties(&state, &client).await;
            Ok(JsValue::from_bool(applied))
        })
    }

    #[wasm_bindgen(js_name = deleteProperty)]
    pub fn delete_property_js(&self, id: String) -> Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let removed = delete_property(&state, &client, &id)
                .await
                .map_err(js_error)?;
            Ok(JsValue::from_bool(removed))
        })
    }

    /// Filter object: `{ search, grade, expiration: { kind, days } }`
    #[wasm_bindgen(js_name = setFilter)]
    pub fn set_filter_js(&self, filter: JsValue) -> Result<(), JsValue> {
        let filter: PropertyFilter = from_js(filter)?;
        self.state.borrow_mut().set_filter(filter);
        Ok(())
    }

    /// Header click on `name`, `health`, `tiv`, `premium` or `expiration`
    #[wasm_bindgen(js_name = toggleSort)]
    pub fn toggle_sort_js(&self, field: &str) -> Result<(), JsValue> {
        let field: SortField = from_js(JsValue::from_str(field))?;
        self.state.borrow_mut().toggle_sort(field);
        Ok(())
    }

    /// Everything the page renders in one object
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let mut state = self.state.borrow_mut();
        let properties = state.visible();
        let stats = state.stats();
        let snapshot = PropertiesSnapshot {
            load: state.load.state(),
            properties,
            stats,
            summary: state.summary.as_ref(),
        };
        to_js(&snapshot)
    }

    #[wasm_bindgen(js_name = getProperty)]
    pub fn get_property(&self, id: &str) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().find(id))
    }

    pub fn unmount(&self) {
        self.state.borrow_mut().unmount();
    }
}
