//! Guard configuration.
//!
//! | Variable                    | Field           | Default                       |
//! |-----------------------------|-----------------|-------------------------------|
//! | `PARAMGUARD_REJECT_STATUS`  | `reject_status` | `422`                         |
//! | `PARAMGUARD_MESSAGE`        | `message`       | `"Request validation failed"` |

use http::StatusCode;
use paramguard::ENV_PREFIX;
use serde::{Deserialize, Serialize};

/// Error type for guard configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid rejection status code: {0}")]
    InvalidStatus(u16),
}

fn default_reject_status() -> u16 {
    StatusCode::UNPROCESSABLE_ENTITY.as_u16()
}

fn default_message() -> String {
    "Request validation failed".to_string()
}

/// How a [`Guard`](crate::Guard) answers requests that fail validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// HTTP status of every rejection.
    #[serde(default = "default_reject_status")]
    pub reject_status: u16,
    /// Top-level message of the rejection body.
    #[serde(default = "default_message")]
    pub message: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            reject_status: default_reject_status(),
            message: default_message(),
        }
    }
}

impl GuardConfig {
    /// Load from `PARAMGUARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = envy::prefixed(ENV_PREFIX).from_env()?;
        config.status()?;
        Ok(config)
    }

    /// Load from an explicit list of variables, as `from_env` would see them.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.status()?;
        Ok(config)
    }

    /// The rejection status as an HTTP status code.
    pub fn status(&self) -> Result<StatusCode, ConfigError> {
        StatusCode::from_u16(self.reject_status)
            .map_err(|_| ConfigError::InvalidStatus(self.reject_status))
    }
}
