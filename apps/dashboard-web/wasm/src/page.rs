//! Load bookkeeping shared by every page controller

use api_client::{ClientError, DataOrigin};
use portfolio_engine::{LoadGuard, LoadTicket};
use serde::Serialize;
use tracing::debug;

/// What the page should render around its data
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready {
        origin: DataOrigin,
    },
    Failed {
        message: String,
        retryable: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub struct PageLoad {
    guard: LoadGuard,
    state: LoadState,
}

impl PageLoad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> LoadTicket {
        self.state = LoadState::Loading;
        self.guard.begin()
    }

    /// Settle a load. Returns the data only when the ticket is still current
    /// and the load succeeded; a stale ticket leaves the state untouched.
    pub fn finish<D>(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<(D, DataOrigin), ClientError>,
    ) -> Option<D> {
        if !self.guard.accept(ticket) {
            debug!(ticket = ticket.id(), "Dropping stale load");
            return None;
        }

        match outcome {
            Ok((data, origin)) => {
                self.state = LoadState::Ready { origin };
                Some(data)
            }
            Err(err) => {
                self.state = LoadState::Failed {
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                };
                None
            }
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn unmount(&mut self) {
        self.guard.unmount();
    }

    pub fn remount(&mut self) {
        self.guard.remount();
    }
}

/// A page built from several loads is a fixture page if any part was
pub(crate) fn combined_origin(origins: &[DataOrigin]) -> DataOrigin {
    if origins.contains(&DataOrigin::Fixture) {
        DataOrigin::Fixture
    } else {
        DataOrigin::Live
    }
}
