//! Program evaluation.
//!
//! An evaluator turns program text into an [`Outcome`]. Programs that crash,
//! hang or print garbage are not errors: they come back as failure outcomes
//! carrying the reserved score so the search can keep going. Only problems
//! with the evaluator itself (for example a missing interpreter) surface as
//! [`EvaluationError`].

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use discovery_types::Outcome;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::EvaluatorConfig;
use crate::error::{EvaluationError, EvaluationResult};

/// Scores candidate programs.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn score(&self, program: &str) -> EvaluationResult<Outcome>;

    /// Name of this evaluator.
    fn name(&self) -> &str;
}

// ── Subprocess evaluator ────────────────────────────────────────────

/// Python harness used when no evaluator command is configured.
///
/// Reads `{"program", "evaluator"}` from stdin, runs the evaluator source to
/// obtain an `evaluator(program, result)` function, executes the program,
/// and prints the evaluator's return value as JSON on the last line.
pub const PYTHON_HARNESS: &str = r#"
import json, sys
if hasattr(sys, "set_int_max_str_digits"):
    sys.set_int_max_str_digits(0)
payload = json.load(sys.stdin)
source = payload.get("evaluator") or (
    "def evaluator(program, result):\n"
    "    return {'score': result if isinstance(result, (int, float)) else 0}\n"
)
namespace = {}
exec(source, namespace)
scope = {}
try:
    exec(payload["program"], {}, scope)
    value = scope.get("result")
except Exception as exc:
    print(json.dumps({"score": -1, "error": str(exc)}))
    sys.exit(0)
print()
print(json.dumps(namespace["evaluator"](payload["program"], value), default=str))
"#;

/// Runs each program in a child process and reads its outcome from stdout.
///
/// The child receives `{"program": ..., "evaluator": ...}` as JSON on stdin.
/// Its last non-empty stdout line is parsed as the outcome.
#[derive(Clone, Debug)]
pub struct ProcessEvaluator {
    command: String,
    args: Vec<String>,
    evaluator_program: Option<String>,
    timeout: Duration,
}

impl ProcessEvaluator {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            evaluator_program: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// `python3 -c <harness>`.
    pub fn python_harness() -> Self {
        Self::new("python3", vec!["-c".into(), PYTHON_HARNESS.into()])
    }

    pub fn from_config(config: &EvaluatorConfig) -> EvaluationResult<Self> {
        let evaluator = match config.command.split_first() {
            None => Self::python_harness(),
            Some((command, args)) => {
                if command.trim().is_empty() {
                    return Err(EvaluationError::InvalidConfig(
                        "evaluator command is blank".into(),
                    ));
                }
                Self::new(command.clone(), args.to_vec())
            }
        };
        Ok(evaluator.with_timeout(Duration::from_secs(config.timeout_secs)))
    }

    /// Source of the scoring function handed to the child.
    pub fn with_evaluator_program(mut self, source: impl Into<String>) -> Self {
        self.evaluator_program = Some(source.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl Evaluator for ProcessEvaluator {
    async fn score(&self, program: &str) -> EvaluationResult<Outcome> {
        let payload = json!({
            "program": program,
            "evaluator": self.evaluator_program,
        });

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EvaluationError::Spawn {
                command: self.command.clone(),
                reason: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits before reading its input is judged by its output.
            if let Err(e) = stdin.write_all(payload.to_string().as_bytes()).await {
                debug!(error = %e, "evaluator closed stdin early");
            }
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Ok(Outcome::failure(format!(
                    "evaluation timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("evaluator exited with {}", output.status));
            return Ok(Outcome::failure(message));
        }

        Ok(parse_outcome(&String::from_utf8_lossy(&output.stdout)))
    }

    fn name(&self) -> &str {
        "process-evaluator"
    }
}

/// Interpret evaluator stdout. Only the last non-empty line counts.
pub fn parse_outcome(stdout: &str) -> Outcome {
    let Some(line) = stdout.lines().rev().find(|l| !l.trim().is_empty()) else {
        return Outcome::failure("evaluator produced no output");
    };

    let value: Value = match serde_json::from_str(line.trim()) {
        Ok(value) => value,
        Err(e) => return Outcome::failure(format!("invalid evaluator output: {}", e)),
    };

    let outcome = match value {
        Value::Object(_) => Outcome::new(value),
        Value::Number(n) => Outcome::scored(n.as_f64().unwrap_or(0.0)),
        other => Outcome::new(json!({ "score": 0, "value": other })),
    };

    normalize(outcome)
}

fn normalize(outcome: Outcome) -> Outcome {
    if outcome.lacks_failure_error() {
        warn!("evaluator reported the reserved failure score without an error");
    }
    outcome.normalized()
}

// ── In-process evaluator ────────────────────────────────────────────

/// Evaluator backed by a plain function. Useful for tests and embedding.
#[derive(Clone)]
pub struct FnEvaluator {
    scorer: Arc<dyn Fn(&str) -> Outcome + Send + Sync>,
}

impl FnEvaluator {
    pub fn new(scorer: impl Fn(&str) -> Outcome + Send + Sync + 'static) -> Self {
        Self {
            scorer: Arc::new(scorer),
        }
    }

    /// Scores a program by how many non-empty lines it has.
    pub fn line_count() -> Self {
        Self::new(|program| {
            Outcome::scored(program.lines().filter(|l| !l.trim().is_empty()).count() as f64)
        })
    }
}

impl std::fmt::Debug for FnEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEvaluator").finish_non_exhaustive()
    }
}

#[async_trait]
impl Evaluator for FnEvaluator {
    async fn score(&self, program: &str) -> EvaluationResult<Outcome> {
        Ok(normalize((self.scorer)(program)))
    }

    fn name(&self) -> &str {
        "fn-evaluator"
    }
}
