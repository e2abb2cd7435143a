//! Declarative validation configuration.
//!
//! This is the `check.response` section of an HTTP monitor: accepted
//! status codes, required headers, body patterns and JSON conditions.
//!
//! ```yaml
//! status: [200, 201]
//! headers:
//!   Content-Type: application/json
//! body:
//!   positive: ["ok"]
//!   negative: ["error"]
//! json:
//!   - description: service is up
//!     condition: 'status == "up"'
//!   - description: no pending jobs
//!     condition:
//!       equals:
//!         queue.pending: 0
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// Response validation settings for one monitor.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ValidationConfig {
    /// Accepted status codes. Empty means "anything below 400".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<u16>,

    /// Required header values, compared exactly.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Body patterns, either a plain list or a positive/negative object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyConfig>,

    /// Conditions evaluated against the body decoded as JSON.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub json: Vec<JsonCheckConfig>,
}

impl ValidationConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Load from a YAML (or JSON, which YAML accepts) file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&contents)
    }

    /// Whether this configuration needs the response body at all.
    pub fn wants_body(&self) -> bool {
        self.body.is_some() || !self.json.is_empty()
    }
}

/// Shape of the `body` setting, resolved once when the config is loaded.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum BodyConfig {
    /// `body: ["pattern", ...]`. Only the first string entry is used.
    PlainPatterns(Vec<Value>),

    /// `body: {positive: [...], negative: [...]}`. Keys keep document order.
    PositiveNegativePatterns(serde_json::Map<String, Value>),
}

impl BodyConfig {
    /// Positive-only patterns.
    pub fn plain<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BodyConfig::PlainPatterns(
            patterns
                .into_iter()
                .map(|p| Value::String(p.into()))
                .collect(),
        )
    }

    /// Object form with the given positive and negative lists.
    pub fn positive_negative<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let to_list =
            |items: Vec<String>| Value::Array(items.into_iter().map(Value::String).collect());
        let mut map = serde_json::Map::new();
        map.insert(
            "positive".to_string(),
            to_list(positive.into_iter().map(Into::into).collect()),
        );
        map.insert(
            "negative".to_string(),
            to_list(negative.into_iter().map(Into::into).collect()),
        );
        BodyConfig::PositiveNegativePatterns(map)
    }
}

/// One JSON body check.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct JsonCheckConfig {
    /// Reported when the condition fails.
    pub description: String,
    /// Predicates serialize as `{operator: ...}` maps rather than YAML tags.
    #[serde(serialize_with = "serde_yaml::with::singleton_map_recursive::serialize")]
    pub condition: ConditionConfig,
}

impl JsonCheckConfig {
    pub fn expression(description: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            condition: ConditionConfig::Expression(expression.into()),
        }
    }

    pub fn predicate(description: impl Into<String>, predicate: PredicateConfig) -> Self {
        Self {
            description: description.into(),
            condition: ConditionConfig::Predicate(predicate),
        }
    }
}

/// A condition is either a Rhai expression or a declarative predicate.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ConditionConfig {
    /// Rhai expression evaluating to a boolean, e.g. `status == "up"`.
    Expression(String),

    /// Declarative predicate, e.g. `{equals: {status: "up"}}`.
    Predicate(PredicateConfig),
}

/// Declarative predicate over a JSON document.
///
/// Field names are dotted paths into nested objects (`queue.pending`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PredicateConfig {
    /// Every field equals the given string, number or boolean.
    Equals(BTreeMap<String, Value>),

    /// Every field contains the given substring.
    Contains(BTreeMap<String, String>),

    /// Every field matches the given regular expression.
    Regexp(BTreeMap<String, String>),

    /// Every numeric field lies within the given bounds.
    Range(BTreeMap<String, RangeBounds>),

    /// Every listed field exists.
    HasFields(Vec<String>),

    Or(Vec<PredicateConfig>),

    And(Vec<PredicateConfig>),

    Not(Box<PredicateConfig>),
}

/// Numeric bounds for a `range` predicate.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RangeBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
}

impl RangeBounds {
    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.gt.is_none_or(|b| value > b)
            && self.gte.is_none_or(|b| value >= b)
            && self.lt.is_none_or(|b| value < b)
            && self.lte.is_none_or(|b| value <= b)
    }
}
