//! Evaluation outcomes.
//!
//! An outcome is whatever structured diagnostics the evaluator returned. The
//! engine only ever reads the numeric `score` field out of it; everything else
//! is passed through untouched to the oracle as context.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Score reserved for programs whose execution failed.
pub const FAILURE_SCORE: f64 = -1.0;

/// Structured diagnostics for one evaluated program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outcome(Value);

impl Outcome {
    /// Wrap raw evaluator output.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Outcome carrying only a score.
    pub fn scored(score: f64) -> Self {
        Self(json!({ "score": score }))
    }

    /// Outcome recorded when the program could not be executed or scored.
    pub fn failure(message: impl Into<String>) -> Self {
        Self(json!({ "score": FAILURE_SCORE, "error": message.into() }))
    }

    /// Numeric fitness; 0 when the field is absent or not a number.
    pub fn score(&self) -> f64 {
        self.0
            .get("score")
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
    }

    /// Error message of a failed evaluation, if any.
    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn is_failure(&self) -> bool {
        self.error().is_some() && self.score() == FAILURE_SCORE
    }

    /// True when the reserved failure score is reported without an error.
    pub fn lacks_failure_error(&self) -> bool {
        self.score() == FAILURE_SCORE && self.error().is_none()
    }

    /// Give a reserved-score outcome an `error` field if it has none, so the
    /// sentinel always denotes a failed evaluation.
    pub fn normalized(self) -> Self {
        if self.lacks_failure_error() {
            self.with_field("error", json!("reserved failure score reported without error"))
        } else {
            self
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Attach an extra diagnostic field. Non-object outcomes are wrapped first.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        if !self.0.is_object() {
            let mut map = Map::new();
            map.insert("value".into(), self.0.take());
            self.0 = Value::Object(map);
        }
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.into(), value);
        }
        self
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
