//! Funding service configuration.
//!
//! Loaded from a YAML document or from environment variables. The target
//! is written in whole units (`"0.123456789"`) and held in wei.

use std::path::Path;

use serde::{Deserialize, Serialize};
use topup_core::{amount::as_units, Address, Amount};

use crate::policy::FundingPolicy;

/// Construction parameters for a [`FundingService`](crate::FundingService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunderConfig {
    /// The service's own address, used as the source of outbound transfers.
    pub service_address: Address,
    /// Address of the root registry.
    pub registry_address: Address,
    /// Initial owner.
    pub owner: Address,
    /// Balance recipients are topped up to.
    #[serde(with = "as_units", default = "default_target")]
    pub target: Amount,
}

fn default_target() -> Amount {
    FundingPolicy::DEFAULT_TARGET
}

impl FunderConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TOPUP_SERVICE_ADDRESS` (required)
    /// - `TOPUP_REGISTRY` (required)
    /// - `TOPUP_OWNER` (required)
    /// - `TOPUP_TARGET` in whole units (default: `0.123456789`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            service_address: env_address("TOPUP_SERVICE_ADDRESS")?,
            registry_address: env_address("TOPUP_REGISTRY")?,
            owner: env_address("TOPUP_OWNER")?,
            target: env_amount("TOPUP_TARGET", FundingPolicy::DEFAULT_TARGET)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// The policy this configuration describes.
    pub fn policy(&self) -> FundingPolicy {
        FundingPolicy::new(self.target)
    }

    /// Check invariants serde cannot express. Called by every loader;
    /// call it directly when the config is embedded in another document.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.is_zero() {
            return Err(ConfigError::ZeroTarget);
        }
        Ok(())
    }
}

fn env_address(var: &str) -> Result<Address, ConfigError> {
    let raw = std::env::var(var).map_err(|_| ConfigError::MissingVar(var.to_string()))?;
    Address::from_hex(&raw).map_err(|e| ConfigError::InvalidVar(var.to_string(), e.to_string()))
}

fn env_amount(var: &str, default: Amount) -> Result<Amount, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => Amount::parse_units(&raw)
            .map_err(|e| ConfigError::InvalidVar(var.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset.
    #[error("{0} environment variable is required")]
    MissingVar(String),

    /// An environment variable failed to parse.
    #[error("invalid value for {0}: {1}")]
    InvalidVar(String, String),

    /// The YAML document is malformed.
    #[error("invalid config document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The config file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A zero target would never fund anyone.
    #[error("target must be non-zero")]
    ZeroTarget,
}
