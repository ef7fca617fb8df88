//! Analytics page: trend charts and the portfolio mix
//!
//! Trend series are generated from a seed so a chart looks the same on every
//! render. The mix comes from the loaded property list.

use std::cell::RefCell;
use std::rc::Rc;

use api_client::{ApiClient, ClientError, Loaded, Transport};
use chrono::{Datelike, Months, NaiveDate, Utc};
use js_sys::Promise;
use portfolio_engine::{
    breakdown_by_type, generate_series, portfolio_stats, ChartSeries, LoadTicket, PortfolioStats,
    SeriesKind, TypeBreakdown,
};
use portfolio_types::Property;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app_state::SharedClient;
use crate::bridge::{from_js, to_js};
use crate::page::{LoadState, PageLoad};

pub const DEFAULT_MONTHS: u32 = 12;
pub const MAX_MONTHS: u32 = 60;
const DEFAULT_SEED: u64 = 42;

#[derive(Debug)]
pub struct AnalyticsState {
    properties: Vec<Property>,
    months: u32,
    seed: u64,
    /// Last month shown on the charts
    through: NaiveDate,
    load: PageLoad,
}

impl Default for AnalyticsState {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl AnalyticsState {
    pub fn new(through: NaiveDate) -> Self {
        Self {
            properties: Vec::new(),
            months: DEFAULT_MONTHS,
            seed: DEFAULT_SEED,
            through,
            load: PageLoad::new(),
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.load.begin()
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Loaded<Vec<Property>>, ClientError>,
    ) -> bool {
        let outcome = outcome.map(|loaded| (loaded.data, loaded.origin));
        match self.load.finish(ticket, outcome) {
            Some(properties) => {
                self.properties = properties;
                true
            }
            None => false,
        }
    }

    /// Clamped to 1..=60 months
    pub fn set_months(&mut self, months: u32) {
        self.months = months.clamp(1, MAX_MONTHS);
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    fn start(&self) -> NaiveDate {
        let first = self.through.with_day(1).unwrap_or(self.through);
        first
            .checked_sub_months(Months::new(self.months - 1))
            .unwrap_or(first)
    }

    pub fn series(&self, kind: SeriesKind) -> ChartSeries {
        generate_series(kind, self.start(), self.months, self.seed)
    }

    pub fn all_series(&self) -> Vec<ChartSeries> {
        [
            SeriesKind::PremiumTrend,
            SeriesKind::ClaimsFrequency,
            SeriesKind::LossRatio,
        ]
        .into_iter()
        .map(|kind| self.series(kind))
        .collect()
    }

    pub fn breakdown(&self) -> Vec<TypeBreakdown> {
        breakdown_by_type(&self.properties)
    }

    pub fn stats(&self) -> PortfolioStats {
        portfolio_stats(&self.properties)
    }

    pub fn load_state(&self) -> &LoadState {
        self.load.state()
    }

    pub fn unmount(&mut self) {
        self.load.unmount();
    }
}

pub async fn load_analytics<T: Transport>(
    page: &RefCell<AnalyticsState>,
    client: &ApiClient<T>,
) -> bool {
    let ticket = page.borrow_mut().begin_load();
    let outcome = client.properties().list().await;
    page.borrow_mut().finish_load(ticket, outcome)
}

#[derive(Serialize)]
struct AnalyticsSnapshot<'a> {
    load: &'a LoadState,
    months: u32,
    series: Vec<ChartSeries>,
    breakdown: Vec<TypeBreakdown>,
    stats: PortfolioStats,
}

#[wasm_bindgen]
pub struct AnalyticsPage {
    state: Rc<RefCell<AnalyticsState>>,
    client: SharedClient,
}

impl AnalyticsPage {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self {
            state: Rc::new(RefCell::new(AnalyticsState::default())),
            client,
        }
    }
}

#[wasm_bindgen]
impl AnalyticsPage {
    pub fn load(&self) -> Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let applied = load_analytics(&state, &client).await;
            Ok(JsValue::from_bool(applied))
        })
    }

    #[wasm_bindgen(js_name = setMonths)]
    pub fn set_months(&self, months: u32) {
        self.state.borrow_mut().set_months(months);
    }

    /// Seeds above 2^53 lose precision in JS, so the seed travels as u32
    #[wasm_bindgen(js_name = setSeed)]
    pub fn set_seed(&self, seed: u32) {
        self.state.borrow_mut().set_seed(u64::from(seed));
    }

    /// One series: `"premium_trend"`, `"claims_frequency"` or `"loss_ratio"`
    pub fn series(&self, kind: &str) -> Result<JsValue, JsValue> {
        let kind: SeriesKind = from_js(JsValue::from_str(kind))?;
        to_js(&self.state.borrow().series(kind))
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        to_js(&AnalyticsSnapshot {
            load: state.load_state(),
            months: state.months(),
            series: state.all_series(),
            breakdown: state.breakdown(),
            stats: state.stats(),
        })
    }

    pub fn unmount(&self) {
        self.state.borrow_mut().unmount();
    }
}
