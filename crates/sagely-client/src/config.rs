//! Configuration loader.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`ClientConfig`]. Falls back to defaults when the file is missing or
//! malformed -- a broken config file must never stop an activation.

use std::path::Path;

use sagely_types::config::ClientConfig;

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults (local development proxy).
/// - Unreadable or unparseable file: warn and fall back to defaults.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config.toml at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}
