//! Typed REST client for the portfolio backend
//!
//! The client is generic over a [`Transport`], so the same code runs over
//! browser `fetch` in the dashboard and over an in-process router in tests.
//!
//! # Example
//!
//! ```ignore
//! let client = ApiClient::new(transport, ClientConfig::default());
//! let page = client.load_properties_page().await?;
//! if page.properties.is_fixture() {
//!     // show the "demo data" banner
//! }
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod transport;

pub use client::{
    AdminApi, ApiClient, ClaimsApi, DashboardApi, DataOrigin, DocumentsApi, EnrichmentApi,
    Loaded, PropertiesApi, PropertiesPageData, RenewalsApi, RenewalsPageData,
};
pub use config::{ClientConfig, DataPolicy};
pub use envelope::{normalize_list, ITEMS_KEY};
pub use error::{ClientError, Result};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, Transport};
