//! Client configuration.
//!
//! Deserialized from `config.toml` in the data directory; every field has a
//! default so a missing or partial file still yields a working config.

use serde::{Deserialize, Serialize};

/// Default REST base, matching the local development proxy.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";

/// Configuration for the backend endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// REST base path, e.g. `https://api.example.com/api/v1`.
    pub base_url: String,
    /// Push-channel URL override. When unset, the channel URL is derived
    /// from `base_url` by scheme rewrite (`http` -> `ws`) against the host
    /// root plus `/ws`.
    pub ws_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ws_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_proxy() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.ws_url.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str("base_url = \"https://api.sagely.app/api/v1\"").unwrap();
        assert_eq!(config.base_url, "https://api.sagely.app/api/v1");
        assert!(config.ws_url.is_none());
    }

    #[test]
    fn empty_toml_is_fully_defaulted() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
