//! The composed validator for one monitor.

use tracing::{debug, trace};

use crate::condition::ConditionSet;
use crate::config::ValidationConfig;
use crate::error::ConfigError;
use crate::pattern::PatternSet;
use crate::reason::{CheckFailure, Reason};
use crate::response::ProbeResponse;
use crate::response_check::ResponseCheck;

/// A check that needs the response body.
#[derive(Debug)]
pub enum BodyCheck {
    Patterns(PatternSet),
    Json(ConditionSet),
}

impl BodyCheck {
    pub fn check(&self, body: &str) -> Result<(), CheckFailure> {
        match self {
            BodyCheck::Patterns(patterns) => patterns.check(body),
            BodyCheck::Json(conditions) => conditions.check(body),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BodyCheck::Patterns(_) => "body patterns",
            BodyCheck::Json(_) => "json conditions",
        }
    }
}

/// Ordered response-level and body-level checks.
///
/// Built once per monitor and shared read-only by every probe.
#[derive(Debug, Default)]
pub struct Validator {
    response_checks: Vec<ResponseCheck>,
    body_checks: Vec<BodyCheck>,
}

impl Validator {
    pub fn new(response_checks: Vec<ResponseCheck>, body_checks: Vec<BodyCheck>) -> Self {
        Self {
            response_checks,
            body_checks,
        }
    }

    /// Compile a validator from its configuration.
    ///
    /// Every pattern and condition is compiled here; the first invalid one
    /// fails the whole validator.
    pub fn from_config(config: &ValidationConfig) -> Result<Self, ConfigError> {
        let mut response_checks = vec![ResponseCheck::status(&config.status)];
        if !config.headers.is_empty() {
            response_checks.push(ResponseCheck::Headers(config.headers.clone()));
        }

        let mut body_checks = Vec::new();
        if let Some(body) = &config.body {
            body_checks.push(BodyCheck::Patterns(PatternSet::from_config(body)?));
        }
        if !config.json.is_empty() {
            body_checks.push(BodyCheck::Json(ConditionSet::compile(&config.json)?));
        }

        debug!(
            response_checks = response_checks.len(),
            body_checks = body_checks.len(),
            "compiled response validator"
        );
        Ok(Self::new(response_checks, body_checks))
    }

    /// Whether [`validate`](Self::validate) needs the body. When false the
    /// caller should not read it and may pass an empty string.
    pub fn wants_body(&self) -> bool {
        !self.body_checks.is_empty()
    }

    pub fn response_checks(&self) -> &[ResponseCheck] {
        &self.response_checks
    }

    pub fn body_checks(&self) -> &[BodyCheck] {
        &self.body_checks
    }

    /// Validate one probe response. `None` means the probe passed.
    pub fn validate<R: ProbeResponse + ?Sized>(&self, response: &R, body: &str) -> Option<Reason> {
        for check in &self.response_checks {
            if let Err(failure) = check.check(response) {
                trace!(%failure, "response check failed");
                return Some(Reason::validate_failed(failure));
            }
        }

        for check in &self.body_checks {
            if let Err(failure) = check.check(body) {
                trace!(check = check.name(), %failure, "body check failed");
                return Some(Reason::validate_failed(failure));
            }
        }

        None
    }
}
