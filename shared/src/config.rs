//! Inference service settings supplied by the shell.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::capabilities::{HttpError, ValidatedUrl, MAX_TIMEOUT_MS};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
/// OCR plus CNN inference on a cold model can take a while.
pub const DEFAULT_DETECTION_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_SUMMARY_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid service base URL: {0}")]
    InvalidBaseUrl(#[source] HttpError),

    #[error("{field} must be between 1 and {max} ms, got {value}")]
    InvalidTimeout {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub detection_timeout_ms: u64,
    pub summary_timeout_ms: u64,
    /// Refuse loopback and private-network service addresses.
    pub block_private_hosts: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            detection_timeout_ms: DEFAULT_DETECTION_TIMEOUT_MS,
            summary_timeout_ms: DEFAULT_SUMMARY_TIMEOUT_MS,
            block_private_hosts: false,
        }
    }
}

impl ServiceConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        Self::check_timeout("detection_timeout_ms", self.detection_timeout_ms)?;
        Self::check_timeout("summary_timeout_ms", self.summary_timeout_ms)?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<ValidatedUrl, ConfigError> {
        let validated = if self.block_private_hosts {
            ValidatedUrl::new_public(self.base_url.as_str())
        } else {
            ValidatedUrl::new(self.base_url.as_str())
        };
        validated.map_err(ConfigError::InvalidBaseUrl)
    }

    pub fn endpoint(&self, path: &str) -> Result<ValidatedUrl, ConfigError> {
        self.base_url()?
            .endpoint(path)
            .map_err(ConfigError::InvalidBaseUrl)
    }

    pub fn detection_timeout(&self) -> Duration {
        Duration::from_millis(self.detection_timeout_ms)
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_millis(self.summary_timeout_ms)
    }

    fn check_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
        if value == 0 || value > MAX_TIMEOUT_MS {
            return Err(ConfigError::InvalidTimeout {
                field,
                value,
                max: MAX_TIMEOUT_MS,
            });
        }
        Ok(())
    }
}
