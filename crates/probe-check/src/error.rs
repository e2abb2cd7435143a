//! Construction-time errors.
//!
//! These are raised once, while a [`Validator`](crate::Validator) is built
//! from its configuration. Per-probe mismatches are never reported through
//! this type; see [`CheckFailure`](crate::CheckFailure) for those.

use thiserror::Error;

/// Errors raised while loading or compiling a validation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A body pattern is not a valid regular expression.
    #[error("invalid body pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A JSON condition could not be compiled.
    #[error("invalid JSON condition '{description}': {message}")]
    InvalidCondition {
        description: String,
        message: String,
    },

    /// The configuration document itself could not be parsed.
    #[error("failed to parse validation config: {0}")]
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid_condition(
        description: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidCondition {
            description: description.into(),
            message: message.into(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
