//! Engine configuration.
//!
//! Configuration is read from JSON or from environment variables layered on
//! top of the defaults:
//!
//! - `KTC_ALGORITHM`: `MAXPOWER_TC`, `D_KTC`, or `E_KTC` (default: `D_KTC`)
//! - `KTC_OPERATION_MODE`: `BATCH` or `INCREMENTAL` (default: `BATCH`)
//! - `KTC_K`: stretch factor (default: 1.41)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::algorithm::{AlgorithmId, OperationMode};

/// Default kTC stretch factor.
pub const DEFAULT_K: f64 = 1.41;

/// Environment variable selecting the algorithm.
pub const ENV_ALGORITHM: &str = "KTC_ALGORITHM";
/// Environment variable selecting the operation mode.
pub const ENV_OPERATION_MODE: &str = "KTC_OPERATION_MODE";
/// Environment variable holding the stretch factor.
pub const ENV_K: &str = "KTC_K";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config JSON is malformed.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting has an unusable value.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Settings for a [`ClassificationEngine`](crate::engine::ClassificationEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Topology control algorithm.
    pub algorithm: AlgorithmId,
    /// Batch or incremental operation.
    pub operation_mode: OperationMode,
    /// Stretch factor passed to each run.
    pub k: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmId::DistanceKtc,
            operation_mode: OperationMode::Batch,
            k: DEFAULT_K,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by the `KTC_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (environment-style names).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ALGORITHM) {
            self.algorithm = AlgorithmId::from_str(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_ALGORITHM,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_OPERATION_MODE) {
            self.operation_mode = OperationMode::from_str(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_OPERATION_MODE,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_K) {
            self.k = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_K,
                value,
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the settings can drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "k",
                value: self.k.to_string(),
            });
        }
        if self.operation_mode == OperationMode::NotSet {
            return Err(ConfigError::InvalidValue {
                key: "operation_mode",
                value: self.operation_mode.to_string(),
            });
        }
        Ok(())
    }
}
