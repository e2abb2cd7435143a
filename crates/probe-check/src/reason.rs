//! Validation outcomes.
//!
//! A passing probe produces no [`Reason`]. A failing one produces exactly
//! one, wrapping the [`CheckFailure`] of the first check that rejected the
//! response.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Reason type reported for every validation failure.
pub const VALIDATE_REASON: &str = "validate";

/// Why a single check rejected a response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckFailure {
    /// Status code is not in the configured list.
    #[error("received status code {actual} expecting {}", format_codes(.expected))]
    UnexpectedStatus { actual: u16, expected: Vec<u16> },

    /// No status list configured and the response is an error (>= 400).
    #[error("{status_line}")]
    ErrorStatus { status_line: String },

    /// A required header is missing or has a different value.
    #[error("header {name} is '{actual}' expecting '{expected}'")]
    HeaderMismatch {
        name: String,
        actual: String,
        expected: String,
    },

    /// No positive pattern matched the body.
    #[error("negative pattern match, but positive pattern mismatch")]
    PositivePatternMismatch,

    /// A positive pattern matched, but so did a negative one.
    #[error("positive pattern match, but negative pattern mismatch")]
    NegativePatternMismatch,

    /// The body is not a JSON object.
    #[error("could not parse JSON for body check with condition. Source: {body}: {error}")]
    JsonDecode { body: String, error: String },

    /// One or more JSON conditions evaluated to false.
    #[error(
        "JSON body did not match {} conditions '{}' for monitor. Received JSON {document}",
        .failed.len(),
        .failed.join(",")
    )]
    JsonConditionsMismatch {
        failed: Vec<String>,
        document: serde_json::Value,
    },
}

fn format_codes(codes: &[u16]) -> String {
    let joined: Vec<String> = codes.iter().map(u16::to_string).collect();
    format!("[{}]", joined.join(" "))
}

/// A failed validation, ready to be turned into a "down" observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reason {
    failure: CheckFailure,
}

impl Reason {
    /// Wrap a check failure as a validation reason.
    pub fn validate_failed(failure: CheckFailure) -> Self {
        Self { failure }
    }

    /// Reason type, always [`VALIDATE_REASON`].
    pub fn reason_type(&self) -> &'static str {
        VALIDATE_REASON
    }

    /// Human-readable failure message.
    pub fn message(&self) -> String {
        self.failure.to_string()
    }

    /// The underlying failure kind.
    pub fn failure(&self) -> &CheckFailure {
        &self.failure
    }

    /// Consume the reason, keeping only the failure kind.
    pub fn into_failure(self) -> CheckFailure {
        self.failure
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.failure)
    }
}

impl std::error::Error for Reason {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failure)
    }
}

impl From<CheckFailure> for Reason {
    fn from(failure: CheckFailure) -> Self {
        Self::validate_failed(failure)
    }
}

impl Serialize for Reason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Reason", 2)?;
        state.serialize_field("type", self.reason_type())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}
