//! Backend configuration.
//!
//! The config file is a JSON array of named backend definitions:
//!
//! ```json
//! [
//!   {"name": "local_1", "type": "local", "connection_info": {"root": "/srv/state"}},
//!   {"name": "aws1", "type": "s3", "connection_info": {
//!       "bucket_name": "team-tfstate",
//!       "role_arn": "arn:aws:iam::123456789:role/state-browse"
//!   }}
//! ]
//! ```

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use statescope_s3::{S3Backend, S3ConnectionInfo};
use statescope_vfs::{BackendList, LocalBackend, StateFs};

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config document is not valid JSON or names an unknown backend
    /// type.
    #[error("could not decode backend config: {0}")]
    Decode(#[from] serde_json::Error),

    /// The config document contains no backends.
    #[error("backend config must contain at least one backend")]
    Empty,
}

/// One named backend definition.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    #[serde(flatten)]
    pub connection: ConnectionConfig,
}

/// How to reach a backend's storage.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "connection_info")]
pub enum ConnectionConfig {
    #[serde(rename = "local")]
    Local(LocalConnectionInfo),
    #[serde(rename = "s3")]
    S3(S3ConnectionInfo),
}

/// Connection settings for a local directory backend.
#[derive(Debug, Deserialize)]
pub struct LocalConnectionInfo {
    /// Directory exposed as the backend root.
    pub root: PathBuf,
}

/// Decode a config document. At least one backend is required.
pub fn parse_backend_configs(raw: &[u8]) -> Result<Vec<BackendConfig>, ConfigError> {
    let configs: Vec<BackendConfig> = serde_json::from_slice(raw)?;
    if configs.is_empty() {
        return Err(ConfigError::Empty);
    }
    Ok(configs)
}

/// Build the backend registry from decoded configs, in config order.
pub async fn build_backends(configs: Vec<BackendConfig>) -> Result<BackendList, ConfigError> {
    let mut backends = BackendList::new();

    for config in configs {
        let fs: Arc<dyn StateFs> = match config.connection {
            ConnectionConfig::Local(info) => {
                info!(name = %config.name, root = %info.root.display(), "registering local backend");
                Arc::new(LocalBackend::new(info.root))
            }
            ConnectionConfig::S3(info) => {
                info!(name = %config.name, bucket = %info.bucket_name, "registering s3 backend");
                Arc::new(S3Backend::connect(&info).await)
            }
        };
        backends.add(config.name, fs);
    }

    Ok(backends)
}
