//! Claims Kanban page
//!
//! Drags are resolved locally by the board. Persisting a move is a separate
//! call; the client decides from its config whether it reaches the server.

use std::cell::RefCell;
use std::rc::Rc;

use api_client::{ApiClient, ClientError, Loaded, Transport};
use js_sys::Promise;
use portfolio_engine::{ColumnSummary, DropOutcome, KanbanBoard, LoadTicket, StatusChange};
use portfolio_types::{Claim, ClaimStatus};
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app_state::SharedClient;
use crate::bridge::{from_js, js_error, to_js};
use crate::page::{LoadState, PageLoad};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    #[serde(flatten)]
    pub summary: ColumnSummary,
    pub claims: Vec<Claim>,
}

#[derive(Debug, Default)]
pub struct ClaimsBoardState {
    board: KanbanBoard,
    load: PageLoad,
}

impl ClaimsBoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.load.begin()
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Loaded<Vec<Claim>>, ClientError>,
    ) -> bool {
        let outcome = outcome.map(|loaded| (loaded.data, loaded.origin));
        match self.load.finish(ticket, outcome) {
            Some(claims) => {
                self.board = KanbanBoard::from_claims(claims);
                true
            }
            None => false,
        }
    }

    pub fn board(&self) -> &KanbanBoard {
        &self.board
    }

    pub fn columns(&self) -> Vec<BoardColumn> {
        self.board
            .summary()
            .into_iter()
            .map(|summary| BoardColumn {
                claims: self.board.column(summary.status).to_vec(),
                summary,
            })
            .collect()
    }

    pub fn drag_start(&mut self, claim_id: &str) -> bool {
        self.board.drag_start(claim_id)
    }

    pub fn drag_over(&self, target: ClaimStatus) -> bool {
        self.board.drag_over(target)
    }

    pub fn drop_on(&mut self, target: ClaimStatus) -> DropOutcome {
        self.board.drop(target)
    }

    pub fn cancel_drag(&mut self) {
        self.board.cancel_drag();
    }

    pub fn set_status(&mut self, claim_id: &str, target: ClaimStatus) -> DropOutcome {
        self.board.set_status(claim_id, target)
    }

    pub fn load_state(&self) -> &LoadState {
        self.load.state()
    }

    pub fn unmount(&mut self) {
        self.load.unmount();
    }
}

pub async fn load_claims<T: Transport>(
    page: &RefCell<ClaimsBoardState>,
    client: &ApiClient<T>,
) -> bool {
    let ticket = page.borrow_mut().begin_load();
    let outcome = client.claims().list().await;
    page.borrow_mut().finish_load(ticket, outcome)
}

/// Send a local move to the server when persistence is on. A rejected move
/// is rolled back on the board so it matches the server again.
pub async fn persist_move<T: Transport>(
    page: &RefCell<ClaimsBoardState>,
    client: &ApiClient<T>,
    change: &StatusChange,
) -> Result<Option<Claim>, ClientError> {
    match client.claims().persist_move(change).await {
        Ok(saved) => Ok(saved),
        Err(err) => {
            warn!(claim_id = %change.claim_id, error = %err, "Move rejected, rolling back");
            page.borrow_mut().set_status(&change.claim_id, change.from);
            Err(err)
        }
    }
}

#[derive(Serialize)]
struct BoardSnapshot<'a> {
    load: &'a LoadState,
    columns: Vec<BoardColumn>,
    total: usize,
    dragging: Option<&'a str>,
}

#[wasm_bindgen]
pub struct ClaimsBoard {
    state: Rc<RefCell<ClaimsBoardState>>,
    client: SharedClient,
}

impl ClaimsBoard {
    pub(crate) fn new(client: SharedClient) -> Self {
        Self {
            state: Rc::new(RefCell::new(ClaimsBoardState::new())),
            client,
        }
    }
}

fn parse_status(status: &str) -> Result<ClaimStatus, JsValue> {
    ClaimStatus::parse(status)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown column: {}", status)))
}

#[wasm_bindgen]
impl ClaimsBoard {
    pub fn load(&self) -> Promise {
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let applied = load_claims(&state, &client).await;
            Ok(JsValue::from_bool(applied))
        })
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        to_js(&BoardSnapshot {
            load: state.load_state(),
            columns: state.columns(),
            total: state.board().total_claims(),
            dragging: state.board().dragging(),
        })
    }

    #[wasm_bindgen(js_name = getClaim)]
    pub fn get_claim(&self, claim_id: &str) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().board().claim(claim_id))
    }

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&self, claim_id: &str) -> bool {
        self.state.borrow_mut().drag_start(claim_id)
    }

    #[wasm_bindgen(js_name = dragOver)]
    pub fn drag_over(&self, status: &str) -> bool {
        ClaimStatus::parse(status).is_some_and(|s| self.state.borrow().drag_over(s))
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&self) {
        self.state.borrow_mut().cancel_drag();
    }

    /// Returns `{ outcome: "moved", claim_id, from, to }` or `{ outcome: "no_op" }`
    #[wasm_bindgen(js_name = drop)]
    pub fn drop_js(&self, status: &str) -> Result<JsValue, JsValue> {
        let target = parse_status(status)?;
        let outcome = self.state.borrow_mut().drop_on(target);
        to_js(&outcome)
    }

    /// Status change from the claim detail modal
    #[wasm_bindgen(js_name = setStatus)]
    pub fn set_status(&self, claim_id: &str, status: &str) -> Result<JsValue, JsValue> {
        let target = parse_status(status)?;
        let outcome = self.state.borrow_mut().set_status(claim_id, target);
        to_js(&outcome)
    }

    /// Resolves to the saved claim, or `null` when moves stay local
    #[wasm_bindgen(js_name = persistMove)]
    pub fn persist_move_js(&self, change: JsValue) -> Result<Promise, JsValue> {
        let change: StatusChange = from_js(change)?;
        let state = Rc::clone(&self.state);
        let client = Rc::clone(&self.client);
        Ok(future_to_promise(async move {
            let saved = persist_move(&state, &client, &change)
                .await
                .map_err(js_error)?;
            to_js(&saved)
        }))
    }

    pub fn unmount(&self) {
        self.state.borrow_mut().unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_client, ScriptedTransport};
    use api_client::{ClientConfig, HttpMethod};
    use futures::executor::block_on;
    use portfolio_engine::fixtures;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn loaded_board() -> RefCell<ClaimsBoardState> {
        let page = RefCell::new(ClaimsBoardState::new());
        assert!(block_on(load_claims(&page, &fixture_client())));
        page
    }

    fn moved(outcome: DropOutcome) -> StatusChange {
        match outcome {
            DropOutcome::Moved(change) => change,
            DropOutcome::NoOp => panic!("expected a move"),
        }
    }

    #[test]
    fn test_columns_in_display_order() {
        let page = loaded_board();
        let columns = page.borrow().columns();

        let statuses: Vec<ClaimStatus> = columns.iter().map(|c| c.summary.status).collect();
        assert_eq!(statuses, ClaimStatus::COLUMNS.to_vec());
        let total: usize = columns.iter().map(|c| c.claims.len()).sum();
        assert_eq!(total, fixtures::claims().len());
    }

    #[test]
    fn test_drag_and_drop_moves_once() {
        let page = loaded_board();
        let mut state = page.borrow_mut();

        assert!(state.drag_start("clm-1001"));
        assert!(state.drag_over(ClaimStatus::Processing));
        let change = moved(state.drop_on(ClaimStatus::Processing));
        assert_eq!(change.from, ClaimStatus::Open);

        // nothing is being dragged any more
        assert_eq!(state.drop_on(ClaimStatus::Closed), DropOutcome::NoOp);
        assert_eq!(
            state.board().claim("clm-1001").map(|c| c.status),
            Some(ClaimStatus::Processing)
        );
    }

    #[test]
    fn test_persist_is_local_by_default() {
        let page = loaded_board();
        let change = moved(page.borrow_mut().set_status("clm-1001", ClaimStatus::Closed));

        let saved = block_on(persist_move(&page, &fixture_client(), &change)).unwrap();
        assert_eq!(saved, None);
        assert_eq!(
            page.borrow().board().claim("clm-1001").map(|c| c.status),
            Some(ClaimStatus::Closed)
        );
    }

    #[test]
    fn test_rejected_move_rolls_back() {
        let page = loaded_board();
        let change = moved(page.borrow_mut().set_status("clm-1001", ClaimStatus::Closed));

        let config = ClientConfig {
            persist_kanban_moves: true,
            ..Default::default()
        };
        let client = ApiClient::new(
            ScriptedTransport::default().route(
                HttpMethod::Post,
                "/api/claims/clm-1001/status",
                500,
                json!({"error": "database unavailable"}),
            ),
            config,
        );

        let err = block_on(persist_move(&page, &client, &change)).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(
            page.borrow().board().claim("clm-1001").map(|c| c.status),
            Some(ClaimStatus::Open)
        );
    }

    #[test]
    fn test_unknown_status_claims_are_kept_off_columns() {
        let page = RefCell::new(ClaimsBoardState::new());
        let client = ApiClient::new(
            ScriptedTransport::default().route(
                HttpMethod::Get,
                "/api/claims",
                200,
                json!([
                    {"id": "c1", "status": "open"},
                    {"id": "c2", "status": "archived"}
                ]),
            ),
            ClientConfig::default(),
        );

        assert!(block_on(load_claims(&page, &client)));
        let state = page.borrow();
        assert_eq!(state.board().total_claims(), 2);
        let shown: usize = state.columns().iter().map(|c| c.claims.len()).sum();
        assert_eq!(shown, 1);
    }
}
