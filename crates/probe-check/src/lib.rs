//! Response validation for HTTP uptime probes.
//!
//! A [`Validator`] is compiled once per monitor from a [`ValidationConfig`]
//! and then judges every probe response: status code, required headers,
//! body patterns and JSON conditions. A passing response yields `None`, a
//! failing one a [`Reason`] describing the first failed check.
//!
//! ```
//! use probe_check::{ValidationConfig, Validator};
//!
//! let config = ValidationConfig::from_yaml_str(
//!     r#"
//! status: [200]
//! body:
//!   positive: ["ok"]
//!   negative: ["error"]
//! "#,
//! )
//! .unwrap();
//! let validator = Validator::from_config(&config).unwrap();
//!
//! let response = hyper::Response::builder().status(200).body(()).unwrap();
//! assert!(validator.wants_body());
//! assert!(validator.validate(&response, "all ok").is_none());
//!
//! let reason = validator.validate(&response, "ok, with error").unwrap();
//! assert_eq!(
//!     reason.message(),
//!     "positive pattern match, but negative pattern mismatch"
//! );
//! ```
//!
//! # Module Structure
//!
//! - `config` - Declarative configuration types
//! - `validator` - Composition of response and body checks
//! - `response_check` - Status and header checks
//! - `pattern` - Positive/negative body patterns
//! - `condition` - JSON body conditions (Rhai expressions and predicates)
//! - `reason` - Failure kinds and the reported reason
//! - `response` - The response view consumed by the checks

pub mod condition;
pub mod config;
mod error;
pub mod pattern;
mod reason;
pub mod response;
pub mod response_check;
pub mod validator;

pub use condition::{Condition, ConditionSet, Document, PredicateCondition, ScriptCondition};
pub use config::{
    BodyConfig, ConditionConfig, JsonCheckConfig, PredicateConfig, RangeBounds, ValidationConfig,
};
pub use error::ConfigError;
pub use pattern::{Matcher, PatternSet};
pub use reason::{CheckFailure, Reason, VALIDATE_REASON};
pub use response::{ProbeResponse, ResponseHead};
pub use response_check::ResponseCheck;
pub use validator::{BodyCheck, Validator};
