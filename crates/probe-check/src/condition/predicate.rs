//! Declarative conditions.
//!
//! Supports `equals`, `contains`, `regexp`, `range`, `has_fields` and the
//! logical operators `or`, `and`, `not`.

use regex::Regex;
use serde_json::Value;

use super::{lookup, Condition, Document};
use crate::config::{PredicateConfig, RangeBounds};

/// Compiled declarative condition.
#[derive(Debug, Clone)]
pub enum PredicateCondition {
    Equals(Vec<(String, Value)>),
    Contains(Vec<(String, String)>),
    Regexp(Vec<(String, Regex)>),
    Range(Vec<(String, RangeBounds)>),
    HasFields(Vec<String>),
    Or(Vec<PredicateCondition>),
    And(Vec<PredicateCondition>),
    Not(Box<PredicateCondition>),
}

impl PredicateCondition {
    /// Compile a predicate configuration.
    pub fn compile(config: &PredicateConfig) -> Result<Self, String> {
        match config {
            PredicateConfig::Equals(fields) => {
                require_fields("equals", fields.len())?;
                for (field, value) in fields {
                    if !matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
                        return Err(format!(
                            "equals on '{field}' supports strings, numbers and booleans, got {value}"
                        ));
                    }
                }
                Ok(PredicateCondition::Equals(
                    fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                ))
            }
            PredicateConfig::Contains(fields) => {
                require_fields("contains", fields.len())?;
                Ok(PredicateCondition::Contains(
                    fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                ))
            }
            PredicateConfig::Regexp(fields) => {
                require_fields("regexp", fields.len())?;
                let compiled = fields
                    .iter()
                    .map(|(field, pattern)| {
                        Regex::new(pattern)
                            .map(|regex| (field.clone(), regex))
                            .map_err(|e| format!("invalid regexp for '{field}': {e}"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PredicateCondition::Regexp(compiled))
            }
            PredicateConfig::Range(fields) => {
                require_fields("range", fields.len())?;
                if let Some((field, _)) = fields.iter().find(|(_, bounds)| bounds.is_empty()) {
                    return Err(format!("range on '{field}' has no bounds"));
                }
                Ok(PredicateCondition::Range(
                    fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                ))
            }
            PredicateConfig::HasFields(fields) => {
                require_fields("has_fields", fields.len())?;
                Ok(PredicateCondition::HasFields(fields.clone()))
            }
            PredicateConfig::Or(predicates) => {
                require_fields("or", predicates.len())?;
                Ok(PredicateCondition::Or(Self::compile_all(predicates)?))
            }
            PredicateConfig::And(predicates) => {
                require_fields("and", predicates.len())?;
                Ok(PredicateCondition::And(Self::compile_all(predicates)?))
            }
            PredicateConfig::Not(inner) => {
                Ok(PredicateCondition::Not(Box::new(Self::compile(inner)?)))
            }
        }
    }

    fn compile_all(predicates: &[PredicateConfig]) -> Result<Vec<Self>, String> {
        predicates.iter().map(Self::compile).collect()
    }

    /// Evaluate against a document.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            PredicateCondition::Equals(fields) => fields.iter().all(|(field, expected)| {
                lookup(document, field).is_some_and(|actual| values_equal(actual, expected))
            }),
            PredicateCondition::Contains(fields) => fields.iter().all(|(field, needle)| {
                lookup(document, field)
                    .is_some_and(|v| strings(v).any(|s| s.contains(needle.as_str())))
            }),
            PredicateCondition::Regexp(fields) => fields.iter().all(|(field, regex)| {
                lookup(document, field).is_some_and(|v| strings(v).any(|s| regex.is_match(s)))
            }),
            PredicateCondition::Range(fields) => fields.iter().all(|(field, bounds)| {
                lookup(document, field)
                    .and_then(Value::as_f64)
                    .is_some_and(|n| bounds.contains(n))
            }),
            PredicateCondition::HasFields(fields) => {
                fields.iter().all(|field| lookup(document, field).is_some())
            }
            PredicateCondition::Or(predicates) => predicates.iter().any(|p| p.matches(document)),
            PredicateCondition::And(predicates) => predicates.iter().all(|p| p.matches(document)),
            PredicateCondition::Not(inner) => !inner.matches(document),
        }
    }
}

impl Condition for PredicateCondition {
    fn check(&self, document: &Document) -> bool {
        self.matches(document)
    }
}

fn require_fields(operator: &str, count: usize) -> Result<(), String> {
    if count == 0 {
        return Err(format!("empty {operator} condition"));
    }
    Ok(())
}

/// A string value, or the string elements of an array.
fn strings(value: &Value) -> Box<dyn Iterator<Item = &str> + '_> {
    match value {
        Value::String(s) => Box::new(std::iter::once(s.as_str())),
        Value::Array(items) => Box::new(items.iter().filter_map(Value::as_str)),
        _ => Box::new(std::iter::empty()),
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64().zip(b.as_f64()).is_some_and(|(a, b)| a == b),
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}
