//! WASM bindings for the portfolio dashboard
//!
//! Page state lives in Rust. Each page controller keeps its data, filters
//! and load status, and exposes a `snapshot()` the page renders from.
//! JavaScript handles DOM events, routing and charts.
//!
//! ## Architecture
//!
//! - `AppState` is created once and owns the API client config, the auth
//!   context and the onboarding answers
//! - Page controllers (`PropertiesPage`, `ClaimsBoard`, `RenewalsPage`,
//!   `AnalyticsPage`, `EnrichmentPanel`) share one client and fetch through
//!   the browser's `fetch`
//! - Loads superseded by a newer load, or finishing after `unmount()`, are
//!   dropped
//! - `tracing` events from every crate go to the browser console at their
//!   own level
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { AppState } from './pkg/dashboard_wasm.js';
//!
//! await init();
//!
//! const app = new AppState({ base_url: '/api', data_policy: 'fallback_to_fixtures' });
//!
//! // Properties page
//! const page = app.propertiesPage();
//! await page.load();
//! page.setFilter({ search: 'miami', expiration: { kind: 'within_days', days: 60 } });
//! page.toggleSort('expiration');
//! render(page.snapshot());
//!
//! // Claims board
//! const board = app.claimsBoard();
//! await board.load();
//! board.dragStart('clm-1001');
//! const outcome = board.drop('processing');
//! if (outcome.outcome === 'moved') await board.persistMove(outcome);
//!
//! // Sign in
//! const result = app.auth().signIn({ email, password });
//! if (!result.success) showFieldErrors(result.errors.fields);
//! ```

pub mod analytics_page;
pub mod app_state;
pub mod auth;
mod bridge;
pub mod claims_board;
pub mod console;
pub mod enrichment_panel;
pub mod fetch;
pub mod onboarding;
pub mod page;
pub mod properties_page;
pub mod renewals_page;

#[cfg(test)]
mod test_support;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use analytics_page::AnalyticsPage;
pub use app_state::AppState;
pub use auth::{AuthContext, AuthSession, CurrentUser};
pub use claims_board::ClaimsBoard;
pub use enrichment_panel::EnrichmentPanel;
pub use fetch::FetchTransport;
pub use onboarding::OnboardingWizard;
pub use page::{LoadState, PageLoad};
pub use properties_page::PropertiesPage;
pub use renewals_page::RenewalsPage;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console::init_logging(tracing::Level::INFO);
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
