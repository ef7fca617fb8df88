//! Research panel with one card per enrichment kind
//!
//! Each card runs at most one request at a time. Requests are slow, so the
//! card is marked loading before the request goes out and the panel stays
//! usable while it runs.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use api_client::{ApiClient, ClientError, Transport};
use js_sys::Promise;
use portfolio_engine::{CardState, EnrichmentCard, SubmitRejected, EXPECTED_LATENCY_SECS};
use portfolio_types::{
    CarrierResearch, EnrichmentKind, LenderRequirements, MarketIntelligence, PropertyRisk,
};
use serde::Serialize;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app_state::SharedClient;
use crate::bridge::{js_error, to_js};

#[derive(Debug)]
pub struct EnrichmentPanelState {
    carrier: EnrichmentCard<CarrierResearch>,
    lender: EnrichmentCard<LenderRequirements>,
    risk: EnrichmentCard<PropertyRisk>,
    market: EnrichmentCard<MarketIntelligence>,
}

impl Default for EnrichmentPanelState {
    fn default() -> Self {
        Self {
            carrier: EnrichmentCard::new(EnrichmentKind::CarrierResearch),
            lender: EnrichmentCard::new(EnrichmentKind::LenderRequirements),
            risk: EnrichmentCard::new(EnrichmentKind::PropertyRisk),
            market: EnrichmentCard::new(EnrichmentKind::MarketIntelligence),
        }
    }
}

impl EnrichmentPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn carrier(&mut self) -> &mut EnrichmentCard<CarrierResearch> {
        &mut self.carrier
    }

    pub fn lender(&mut self) -> &mut EnrichmentCard<LenderRequirements> {
        &mut self.lender
    }

    pub fn risk(&mut self) -> &mut EnrichmentCard<PropertyRisk> {
        &mut self.risk
    }

    pub fn market(&mut self) -> &mut EnrichmentCard<MarketIntelligence> {
        &mut self.market
    }

    pub fn is_loading(&self, kind: EnrichmentKind) -> bool {
        match kind {
            EnrichmentKind::CarrierResearch => self.carrier.is_loading(),
            EnrichmentKind::LenderRequirements => self.lender.is_loading(),
            EnrichmentKind::PropertyRisk => self.risk.is_loading(),
            EnrichmentKind::MarketIntelligence => self.market.is_loading(),
        }
    }

    pub fn toggle_expanded(&mut self, kind: EnrichmentKind) -> bool {
        match kind {
            EnrichmentKind::CarrierResearch => self.carrier.toggle_expanded(),
            EnrichmentKind::LenderRequirements => self.lender.toggle_expanded(),
            EnrichmentKind::PropertyRisk => self.risk.toggle_expanded(),
            EnrichmentKind::MarketIntelligence => self.market.toggle_expanded(),
        }
    }

    pub fn reset(&mut self, kind: EnrichmentKind) {
        match kind {
            EnrichmentKind::CarrierResearch => self.carrier.reset(),
            EnrichmentKind::LenderRequirements => self.lender.reset(),
            EnrichmentKind::PropertyRisk => self.risk.reset(),
            EnrichmentKind::MarketIntelligence => self.market.reset(),
        }
    }
}

/// Submit on the card, await the request without holding the panel borrowed,
/// then settle the card with the outcome
async fn run_card<R, F, Fut>(
    panel: &RefCell<EnrichmentPanelState>,
    card: fn(&mut EnrichmentPanelState) -> &mut EnrichmentCard<R>,
    query: Option<&str>,
    fetch: F,
) -> Result<(), SubmitRejected>
where
    R: Clone,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<R, ClientError>>,
{
    let (ticket, query) = {
        let mut state = panel.borrow_mut();
        let slot = card(&mut state);
        match query {
            Some(query) => slot.submit(query)?,
            // retry: nothing to do unless the card failed
            None => match slot.retry() {
                Some(started) => started,
                None => return Ok(()),
            },
        }
    };

    debug!(query = %query, "Enrichment request started");
    let outcome = fetch(query).await.map_err(|e| e.to_string());
    card(&mut panel.borrow_mut()).complete(ticket, outcome);
    Ok(())
}

async fn dispatch<T: Transport>(
    panel: &RefCell<EnrichmentPanelState>,
    client: &ApiClient<T>,
    kind: EnrichmentKind,
    query: Option<&str>,
) -> Result<(), SubmitRejected> {
    let api = client.enrichment();
    let api = &api;
    match kind {
        EnrichmentKind::CarrierResearch => {
            run_card(panel, EnrichmentPanelState::carrier, query, |q| async move {
                api.carrier_research(&q).await
            })
            .await
        }
        EnrichmentKind::LenderRequirements => {
            run_card(panel, EnrichmentPanelState::lender, query, |q| async move {
                api.lender_requirements(&q).await
            })
            .await
        }
        EnrichmentKind::PropertyRisk => {
            run_card(panel, EnrichmentPanelState::risk, query, |q| async move {
                api.property_risk(&q).await
            })
            .await
        }
        EnrichmentKind::MarketIntelligence => {
            run_card(panel, EnrichmentPanelState::market, query, |q| async move {
                api.market_intelligence(&q).await
            })
            .await
        }
    }
}

/// Run one card's query. A rejected submit (empty query, request already
/// running) leaves the card as it was.
pub async fn run_enrichment<T: Transport>(
    panel: &RefCell<EnrichmentPanelState>,
    client: &ApiClient<T>,
    kind: EnrichmentKind,
    query: &str,
) -> Result<(), SubmitRejected> {
    dispatch(panel, client, kind, Some(query)).await
}

/// Re-run a failed card with its last query
pub async fn retry_enrichment<T: Transport>(
    panel: &RefCell<EnrichmentPanelState>,
    client: &ApiClient<T>,
    kind: EnrichmentKind,
) -> Result<(), SubmitRejected> {
    dispatch(panel, client, kind, None).await
}

#[derive(Serialize)]
struct CardView<'a, R> {
    kind: EnrichmentKind,
    title: &'static str,
    query_label: &'static str,
    expanded: bool,
    card: &'a CardState<R>,
}

impl<'a, R: Clone> From<&'a EnrichmentCard<R>> for CardView<'a, R> {
    fn from(card: &'a EnrichmentCard<R>) -> Self {
        let kind = card.kind();
        CardView {
            kind,
            title: kind.title(),
            query_label: kind.query_label(),
            expanded: card.is_expanded(),
            card: card.state(),
        }
    }
}

#[derive(Serialize)]
struct PanelSnapshot<'a> {
    expected_latency_secs: (u32, u32),
    carrier_research: CardView<'a, CarrierResearch>,
    lender_requirements: CardView<'a, LenderRequirements>,
    property_risk: CardView<'a, PropertyRisk>,
    market_intelligence: CardView<'a, MarketIntelligence>,
}

fn parse_kind(kind: &str) -> Result<EnrichmentKind, JsValue> {
    EnrichmentKind::parse(kind)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown enrichment kind: {}", kind)))
}

#[wasm_bindgen]
pub struct EnrichmentPanel {
    state: Rc<RefCell<EnrichmentPanelState>>,
    client: SharedClient,
}

impl EnrichmentPanel {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self {
            state: Rc::new(RefCell::new(EnrichmentPanelState::new())),
            client,
        }
    }
}

#[wasm_bindgen]
impl EnrichmentPanel {
    /// Resolves once the card settles. Rejects only when the submit itself is
    /// refused; request failures show on the card.
    #[wasm_bindgen(js_name = runEnrichment)]
    pub fn run_enrichment_js(&self, kind: &str, query: String) -> Result<Promise, JsValue> {
        let kind = parse_kind(kind)?;
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        Ok(future_to_promise(async move {
            run_enrichment(&state, &client, kind, &query)
                .await
                .map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        }))
    }

    pub fn retry(&self, kind: &str) -> Result<Promise, JsValue> {
        let kind = parse_kind(kind)?;
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        Ok(future_to_promise(async move {
            retry_enrichment(&state, &client, kind)
                .await
                .map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        }))
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self, kind: &str) -> Result<bool, JsValue> {
        Ok(self.state.borrow().is_loading(parse_kind(kind)?))
    }

    #[wasm_bindgen(js_name = toggleExpanded)]
    pub fn toggle_expanded(&self, kind: &str) -> Result<bool, JsValue> {
        Ok(self.state.borrow_mut().toggle_expanded(parse_kind(kind)?))
    }

    pub fn reset(&self, kind: &str) -> Result<(), JsValue> {
        self.state.borrow_mut().reset(parse_kind(kind)?);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        to_js(&PanelSnapshot {
            expected_latency_secs: EXPECTED_LATENCY_SECS,
            carrier_research: CardView::from(&state.carrier),
            lender_requirements: CardView::from(&state.lender),
            property_risk: CardView::from(&state.risk),
            market_intelligence: CardView::from(&state.market),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;
    use api_client::{ClientConfig, HttpMethod};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn client() -> ApiClient<ScriptedTransport> {
        ApiClient::new(
            ScriptedTransport::default()
                .route(
                    HttpMethod::Post,
                    "/api/enrichment/carrier",
                    200,
                    json!({"carrier_name": "Heritage", "am_best_rating": "A"}),
                )
                .route(
                    HttpMethod::Post,
                    "/api/enrichment/market-intelligence",
                    503,
                    json!({"error": "research service busy"}),
                ),
            ClientConfig::default(),
        )
    }

    #[test]
    fn test_successful_card_loads_and_expands() {
        let panel = RefCell::new(EnrichmentPanelState::new());
        block_on(run_enrichment(
            &panel,
            &client(),
            EnrichmentKind::CarrierResearch,
            "  Heritage ",
        ))
        .unwrap();

        let mut state = panel.borrow_mut();
        let card = state.carrier();
        assert_eq!(card.result().map(|r| r.carrier_name.as_str()), Some("Heritage"));
        assert!(card.is_expanded());
    }

    #[test]
    fn test_failed_card_keeps_query_for_retry() {
        let panel = RefCell::new(EnrichmentPanelState::new());
        let client = client();
        block_on(run_enrichment(
            &panel,
            &client,
            EnrichmentKind::MarketIntelligence,
            "South Florida",
        ))
        .unwrap();

        match panel.borrow_mut().market().state() {
            CardState::Failed { query, message } => {
                assert_eq!(query, "South Florida");
                assert!(message.contains("research service busy"));
            }
            other => panic!("unexpected state {:?}", other),
        }

        block_on(retry_enrichment(&panel, &client, EnrichmentKind::MarketIntelligence)).unwrap();
        assert!(matches!(
            panel.borrow_mut().market().state(),
            CardState::Failed { .. }
        ));
    }

    #[test]
    fn test_empty_query_rejected_without_request() {
        let panel = RefCell::new(EnrichmentPanelState::new());
        let transport = Rc::new(ScriptedTransport::default());
        let client = ApiClient::new(Rc::clone(&transport), ClientConfig::default());

        let err = block_on(run_enrichment(
            &panel,
            &client,
            EnrichmentKind::LenderRequirements,
            "   ",
        ))
        .unwrap_err();
        assert_eq!(err, SubmitRejected::EmptyQuery);
        assert!(transport.requests().is_empty());
        assert_eq!(panel.borrow_mut().lender().state(), &CardState::Idle);
    }

    #[test]
    fn test_loading_card_refuses_second_submit() {
        let panel = RefCell::new(EnrichmentPanelState::new());
        panel.borrow_mut().risk().submit("prop-006").unwrap();
        assert!(panel.borrow().is_loading(EnrichmentKind::PropertyRisk));

        let err = block_on(run_enrichment(
            &panel,
            &client(),
            EnrichmentKind::PropertyRisk,
            "prop-001",
        ))
        .unwrap_err();
        assert_eq!(err, SubmitRejected::AlreadyLoading);
    }

    #[test]
    fn test_reset_while_loading_drops_late_response() {
        let panel = RefCell::new(EnrichmentPanelState::new());
        let report: CarrierResearch =
            serde_json::from_value(json!({"carrier_name": "Carrier A", "am_best_rating": "A"}))
                .unwrap();

        // The user resets and searches again while the first request is out
        block_on(run_card(
            &panel,
            EnrichmentPanelState::carrier,
            Some("Carrier A"),
            |_| async {
                let mut state = panel.borrow_mut();
                state.reset(EnrichmentKind::CarrierResearch);
                state.carrier().submit("Carrier B").unwrap();
                Ok::<_, ClientError>(report)
            },
        ))
        .unwrap();

        assert_eq!(
            panel.borrow_mut().carrier().state(),
            &CardState::Loading {
                query: "Carrier B".to_string()
            }
        );
    }

    #[test]
    fn test_retry_on_idle_card_is_noop() {
        let panel = RefCell::new(EnrichmentPanelState::new());
        block_on(retry_enrichment(&panel, &client(), EnrichmentKind::CarrierResearch)).unwrap();
        assert_eq!(panel.borrow_mut().carrier().state(), &CardState::Idle);
    }
}
