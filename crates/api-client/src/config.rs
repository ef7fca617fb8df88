//! Client configuration
//!
//! Every field has a default so an empty TOML document (or JS object) is a
//! valid config:
//!
//! ```toml
//! base_url = "https://api.example.com/api"
//! data_policy = "fallback_to_fixtures"
//! persist_kanban_moves = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// What list loaders do when the backend fails or answers with nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataPolicy {
    /// Surface the error; pages show an error state with retry
    #[default]
    Live,
    /// Serve mock fixtures instead, tagged so the page can say so
    FallbackToFixtures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub data_policy: DataPolicy,
    /// Send Kanban drops to the backend. Off means moves stay local.
    #[serde(default)]
    pub persist_kanban_moves: bool,
}

fn default_base_url() -> String {
    "/api".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_policy: DataPolicy::default(),
            persist_kanban_moves: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: DataPolicy) -> Self {
        self.data_policy = policy;
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Join `path` onto the base URL with exactly one slash between them
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
