use rhai::{Dynamic, Engine, Map, Scope, AST};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::{Condition, Document};

/// Upper bound on operations per evaluation.
const MAX_OPERATIONS: u64 = 100_000;

/// Variable holding the whole decoded document.
const DOCUMENT_VARIABLE: &str = "json";

/// Engine shared by all expression conditions of one validator.
pub(super) fn create_engine() -> Engine {
    let mut engine = Engine::new();
    engine.set_max_operations(MAX_OPERATIONS);
    engine.on_print(|text| debug!(output = text, "condition print"));
    engine.on_debug(|text, _, pos| debug!(output = text, %pos, "condition debug"));
    engine
}

/// A Rhai expression evaluated against the decoded body.
///
/// Top-level fields are bound as variables and the whole document as
/// `json`, so both `status == "up"` and `json["queue"]["pending"] == 0`
/// work. A top-level field named `json` is hidden by the document binding
/// and is reachable only as `json["json"]`. Anything other than a boolean
/// result counts as a failure.
#[derive(Clone)]
pub struct ScriptCondition {
    engine: Arc<Engine>,
    ast: AST,
    source: String,
}

impl ScriptCondition {
    pub fn compile(engine: Arc<Engine>, expression: &str) -> Result<Self, String> {
        let ast = engine
            .compile_expression(expression)
            .map_err(|e| format!("failed to compile expression: {e}"))?;

        Ok(Self {
            engine,
            ast,
            source: expression.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn evaluate(&self, document: &Document) -> Result<bool, String> {
        let mut scope = Scope::new();
        for (key, value) in document {
            if key != DOCUMENT_VARIABLE {
                scope.push_dynamic(key.as_str(), json_to_dynamic(value));
            }
        }
        scope.push_dynamic(
            DOCUMENT_VARIABLE,
            json_to_dynamic(&Value::Object(document.clone())),
        );

        let result: Dynamic = self
            .engine
            .eval_ast_with_scope(&mut scope, &self.ast)
            .map_err(|e| format!("evaluation error: {e}"))?;

        result
            .as_bool()
            .map_err(|type_name| format!("expected a boolean result, got {type_name}"))
    }
}

impl Condition for ScriptCondition {
    fn check(&self, document: &Document) -> bool {
        match self.evaluate(document) {
            Ok(passed) => passed,
            Err(e) => {
                debug!(expression = %self.source, error = %e, "condition did not evaluate");
                false
            }
        }
    }
}

impl fmt::Debug for ScriptCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptCondition")
            .field("source", &self.source)
            .finish()
    }
}

fn json_to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Dynamic::from(i)
            } else if let Some(f) = n.as_f64() {
                Dynamic::from(f)
            } else {
                Dynamic::UNIT
            }
        }
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Array(arr) => {
            let vec: Vec<Dynamic> = arr.iter().map(json_to_dynamic).collect();
            Dynamic::from(vec)
        }
        Value::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.as_str().into(), json_to_dynamic(v));
            }
            Dynamic::from(map)
        }
    }
}
