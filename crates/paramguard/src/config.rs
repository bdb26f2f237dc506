//! Session configuration.
//!
//! Loaded from code or from `PARAMGUARD_*` environment variables:
//!
//! | Variable           | Field   | Default |
//! |--------------------|---------|---------|
//! | `PARAMGUARD_DEBUG` | `debug` | `false` |

use serde::{Deserialize, Serialize};

/// Prefix shared by all environment variables read by this crate.
pub const ENV_PREFIX: &str = "PARAMGUARD_";

/// Error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),
}

/// Options shared by every run of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Attach a rendering of the offending value to each error entry.
    #[serde(default)]
    pub debug: bool,
}

impl SessionConfig {
    /// Configuration with debug rendering switched on or off.
    pub fn debug(debug: bool) -> Self {
        Self { debug }
    }

    /// Load from `PARAMGUARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Self>()?)
    }

    /// Load from an explicit list of variables, as `from_env` would see them.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, Self>(vars)?)
    }
}
