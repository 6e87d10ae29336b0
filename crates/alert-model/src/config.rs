//! Normalizer Configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::ModelError;
use crate::fingerprint::MAX_FINGERPRINT_LEN;
use crate::record::DEFAULT_ENVIRONMENT;

/// File looked up in the working directory when no path is given (any supported extension)
pub const DEFAULT_CONFIG_FILE: &str = "alert-normalize";
/// Prefix for environment overrides, e.g. `ALERT_NORMALIZE_LOG_LEVEL=debug`
pub const ENV_PREFIX: &str = "ALERT_NORMALIZE";

/// Length of a hex SHA-256 digest; name hashes must never be cut
const MIN_FINGERPRINT_LEN: usize = 64;

/// Normalizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Explicit fingerprints are truncated to this many characters, at most 255 (default: 255)
    pub fingerprint_max_len: usize,
    /// Environment for payloads that carry none (default: "undefined")
    pub default_environment: String,
    /// Log level used by binaries embedding the normalizer (default: "info")
    pub log_level: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            fingerprint_max_len: MAX_FINGERPRINT_LEN,
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl NormalizerConfig {
    /// Load from an optional file, then apply `ALERT_NORMALIZE_*` environment overrides.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ModelError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Self::from_settings(settings)
    }

    /// Load from TOML text, without environment overrides
    pub fn from_toml(toml: &str) -> Result<Self, ModelError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> Result<Self, ModelError> {
        let cfg: NormalizerConfig = settings.try_deserialize()?;
        cfg.validate()?;
        debug!("Loaded normalizer config: {:?}", cfg);
        Ok(cfg)
    }

    /// Check invariants the normalizer relies on
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(MIN_FINGERPRINT_LEN..=MAX_FINGERPRINT_LEN).contains(&self.fingerprint_max_len) {
            return Err(ModelError::Config(format!(
                "fingerprint_max_len must be within {MIN_FINGERPRINT_LEN}..={MAX_FINGERPRINT_LEN}, got {}",
                self.fingerprint_max_len
            )));
        }
        if self.default_environment.is_empty() {
            return Err(ModelError::Config(
                "default_environment must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
