//! JSON body conditions.
//!
//! A [`ConditionSet`] decodes the body as a JSON object and evaluates every
//! configured condition against it. Unlike the other checks it does not
//! stop at the first failure: all failing descriptions are reported
//! together.
//!
//! # Module Structure
//!
//! - `script` - Rhai expression conditions
//! - `predicate` - declarative `equals`/`contains`/`range`/... conditions

mod predicate;
mod script;

use serde_json::{Map, Number, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::{ConditionConfig, JsonCheckConfig};
use crate::error::ConfigError;
use crate::reason::CheckFailure;

pub use predicate::PredicateCondition;
pub use script::ScriptCondition;

/// A decoded JSON body.
pub type Document = Map<String, Value>;

/// A compiled predicate over a decoded document.
pub trait Condition: fmt::Debug + Send + Sync {
    fn check(&self, document: &Document) -> bool;
}

/// Compile a single condition configuration.
pub fn compile_condition(
    description: &str,
    config: &ConditionConfig,
    engine: &Arc<rhai::Engine>,
) -> Result<Box<dyn Condition>, ConfigError> {
    let compiled: Result<Box<dyn Condition>, String> = match config {
        ConditionConfig::Expression(expression) => {
            ScriptCondition::compile(Arc::clone(engine), expression)
                .map(|c| Box::new(c) as Box<dyn Condition>)
        }
        ConditionConfig::Predicate(predicate) => {
            PredicateCondition::compile(predicate).map(|c| Box::new(c) as Box<dyn Condition>)
        }
    };
    compiled.map_err(|e| ConfigError::invalid_condition(description, e))
}

#[derive(Debug)]
struct CompiledCheck {
    description: String,
    condition: Box<dyn Condition>,
}

/// Ordered, compiled JSON checks.
#[derive(Debug)]
pub struct ConditionSet {
    checks: Vec<CompiledCheck>,
}

impl ConditionSet {
    /// Compile every check. Any failure aborts the whole set.
    pub fn compile(checks: &[JsonCheckConfig]) -> Result<Self, ConfigError> {
        let engine = Arc::new(script::create_engine());
        let checks = checks
            .iter()
            .map(|check| {
                Ok(CompiledCheck {
                    description: check.description.clone(),
                    condition: compile_condition(&check.description, &check.condition, &engine)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { checks })
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Decode `body` and evaluate every condition against it.
    ///
    /// Only the first JSON value in the body is decoded; anything after it
    /// is ignored.
    pub fn check(&self, body: &str) -> Result<(), CheckFailure> {
        let mut document = decode_first(body).map_err(|e| CheckFailure::JsonDecode {
            body: body.to_string(),
            error: e.to_string(),
        })?;

        normalize_numbers(&mut document);

        let failed: Vec<String> = self
            .checks
            .iter()
            .filter(|check| !check.condition.check(&document))
            .map(|check| check.description.clone())
            .collect();

        if failed.is_empty() {
            return Ok(());
        }

        debug!(
            failed = failed.len(),
            total = self.checks.len(),
            "JSON body conditions failed"
        );
        Err(CheckFailure::JsonConditionsMismatch {
            failed,
            document: Value::Object(document),
        })
    }
}

fn decode_first(body: &str) -> serde_json::Result<Document> {
    serde_json::Deserializer::from_str(body)
        .into_iter::<Document>()
        .next()
        // blank body: let the plain decoder report the EOF
        .unwrap_or_else(|| serde_json::from_str(body))
}

/// Give every number a single representation: `i64` when it fits, `f64`
/// otherwise.
pub fn normalize_numbers(document: &mut Document) {
    for value in document.values_mut() {
        normalize_value(value);
    }
}

fn normalize_value(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if n.is_i64() || n.is_f64() {
                return;
            }
            // u64 above i64::MAX
            if let Some(f) = n.as_f64().and_then(Number::from_f64) {
                *n = f;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_value),
        Value::Object(map) => map.values_mut().for_each(normalize_value),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

/// Look up a dotted path (`a.b.c`) in a document.
///
/// A key containing dots is matched as a whole before the path is split.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    if let Some(value) = document.get(path) {
        return Some(value);
    }
    let (head, rest) = path.split_once('.')?;
    match document.get(head)? {
        Value::Object(nested) => lookup(nested, rest),
        _ => None,
    }
}
