//! Fetch-on-demand enrichment card
//!
//! Idle shows the search control; a submit moves to Loading until the single
//! request completes, then Loaded or Failed. Failed keeps the query so the
//! card can retry it. Each request carries a ticket; a response whose ticket
//! is no longer current (the card was reset or resubmitted) is dropped.

use portfolio_types::EnrichmentKind;
use serde::{Deserialize, Serialize};

use crate::load_guard::{LoadGuard, LoadTicket};

/// Research requests routinely take 30-120 seconds
pub const EXPECTED_LATENCY_SECS: (u32, u32) = (30, 120);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CardState<R> {
    Idle,
    Loading { query: String },
    Loaded { query: String, result: R },
    Failed { query: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    EmptyQuery,
    AlreadyLoading,
}

impl std::fmt::Display for SubmitRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitRejected::EmptyQuery => write!(f, "Enter a search term"),
            SubmitRejected::AlreadyLoading => write!(f, "A request is already running"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentCard<R> {
    kind: EnrichmentKind,
    state: CardState<R>,
    expanded: bool,
    guard: LoadGuard,
}

impl<R: Clone> EnrichmentCard<R> {
    pub fn new(kind: EnrichmentKind) -> Self {
        Self {
            kind,
            state: CardState::Idle,
            expanded: false,
            guard: LoadGuard::new(),
        }
    }

    pub fn kind(&self) -> EnrichmentKind {
        self.kind
    }

    pub fn state(&self) -> &CardState<R> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, CardState::Loading { .. })
    }

    /// Start a request. Returns the ticket to complete with and the trimmed
    /// query to send.
    pub fn submit(&mut self, query: &str) -> Result<(LoadTicket, String), SubmitRejected> {
        if self.is_loading() {
            return Err(SubmitRejected::AlreadyLoading);
        }

        let query = query.trim();
        if query.is_empty() {
            return Err(SubmitRejected::EmptyQuery);
        }

        self.state = CardState::Loading {
            query: query.to_string(),
        };
        Ok((self.guard.begin(), query.to_string()))
    }

    /// Re-run the last failed query
    pub fn retry(&mut self) -> Option<(LoadTicket, String)> {
        match &self.state {
            CardState::Failed { query, .. } => {
                let query = query.clone();
                self.state = CardState::Loading {
                    query: query.clone(),
                };
                Some((self.guard.begin(), query))
            }
            _ => None,
        }
    }

    /// Apply the response. Ignored unless `ticket` belongs to the request
    /// that is outstanding.
    pub fn complete(&mut self, ticket: LoadTicket, outcome: Result<R, String>) {
        if !self.guard.accept(ticket) {
            return;
        }
        let CardState::Loading { query } = &self.state else {
            return;
        };
        let query = query.clone();

        self.state = match outcome {
            Ok(result) => {
                self.expanded = true;
                CardState::Loaded { query, result }
            }
            Err(message) => CardState::Failed { query, message },
        };
    }

    pub fn reset(&mut self) {
        self.guard.invalidate();
        self.state = CardState::Idle;
        self.expanded = false;
    }

    pub fn toggle_expanded(&mut self) -> bool {
        if matches!(self.state, CardState::Loaded { .. }) {
            self.expanded = !self.expanded;
        }
        self.expanded
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn result(&self) -> Option<&R> {
        match &self.state {
            CardState::Loaded { result, .. } => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_then_load() {
        let mut card: EnrichmentCard<String> =
            EnrichmentCard::new(EnrichmentKind::CarrierResearch);
        let (ticket, query) = card.submit("  Travelers ").unwrap();
        assert_eq!(query, "Travelers");
        assert!(card.is_loading());
        assert_eq!(card.submit("Chubb"), Err(SubmitRejected::AlreadyLoading));

        card.complete(ticket, Ok("A++".to_string()));
        assert_eq!(card.result().map(String::as_str), Some("A++"));
        assert!(card.is_expanded());
        assert!(!card.toggle_expanded());
    }

    #[test]
    fn test_empty_query_rejected() {
        let mut card: EnrichmentCard<String> =
            EnrichmentCard::new(EnrichmentKind::MarketIntelligence);
        assert_eq!(card.submit("   "), Err(SubmitRejected::EmptyQuery));
        assert_eq!(card.state(), &CardState::Idle);
    }

    #[test]
    fn test_failure_then_retry() {
        let mut card: EnrichmentCard<String> =
            EnrichmentCard::new(EnrichmentKind::LenderRequirements);
        let (ticket, _) = card.submit("Fannie Mae").unwrap();
        card.complete(ticket, Err("gateway timeout".to_string()));
        assert_eq!(
            card.state(),
            &CardState::Failed {
                query: "Fannie Mae".to_string(),
                message: "gateway timeout".to_string()
            }
        );

        let (_, query) = card.retry().unwrap();
        assert_eq!(query, "Fannie Mae");
        assert!(card.is_loading());
        assert_eq!(card.retry(), None);
    }

    #[test]
    fn test_complete_without_request_is_ignored() {
        let mut card: EnrichmentCard<String> = EnrichmentCard::new(EnrichmentKind::PropertyRisk);
        card.complete(LoadTicket::from_id(0), Ok("late".to_string()));
        assert_eq!(card.state(), &CardState::Idle);
    }

    #[test]
    fn test_response_after_reset_does_not_land_on_new_query() {
        let mut card: EnrichmentCard<String> =
            EnrichmentCard::new(EnrichmentKind::CarrierResearch);
        let (first, _) = card.submit("Carrier A").unwrap();
        card.reset();
        let (second, _) = card.submit("Carrier B").unwrap();

        card.complete(first, Ok("result for Carrier A".to_string()));
        assert_eq!(
            card.state(),
            &CardState::Loading {
                query: "Carrier B".to_string()
            }
        );

        card.complete(second, Ok("result for Carrier B".to_string()));
        assert_eq!(
            card.result().map(String::as_str),
            Some("result for Carrier B")
        );
    }

    #[test]
    fn test_failed_response_after_reset_is_dropped() {
        let mut card: EnrichmentCard<String> = EnrichmentCard::new(EnrichmentKind::PropertyRisk);
        let (ticket, _) = card.submit("prop-004").unwrap();
        card.reset();
        card.complete(ticket, Err("timeout".to_string()));
        assert_eq!(card.state(), &CardState::Idle);
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let state: CardState<u32> = CardState::Loading {
            query: "Miami".to_string(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "loading");
        assert_eq!(json["query"], "Miami");
    }
}
