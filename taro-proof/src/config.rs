//! Loading [`ProofConfig`] from JSON.

use std::{fs, path::Path};

use taro_proof_core::config::{ConfigError, ProofConfig};
use thiserror::Error;

/// Errors returned while loading a configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Parses and validates a configuration from a JSON document.
///
/// Missing fields take their default values.
pub fn from_json_str(json: &str) -> Result<ProofConfig, Error> {
    let config: ProofConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ProofConfig, Error> {
    let path = path.as_ref();
    log::debug!("loading proof config from {}", path.display());
    let json = fs::read_to_string(path)?;
    from_json_str(&json)
}
