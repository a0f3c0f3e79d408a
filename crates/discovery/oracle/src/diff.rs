//! SEARCH/REPLACE diff application.
//!
//! Mutation responses describe edits as blocks of the form
//!
//! ```text
//! <<<<<<< SEARCH
//! original lines
//! =======
//! replacement lines
//! >>>>>>> REPLACE
//! ```
//!
//! Blocks are applied in order. Each replaces every occurrence of its search
//! text; blocks whose search text is empty or absent are skipped.

use regex::Regex;
use tracing::debug;

use crate::error::{OracleError, OracleResult};

const BLOCK_PATTERN: &str = r"(?s)<<<<<<< SEARCH\n(.*?)\n=======\n(.*?)\n>>>>>>> REPLACE";

/// Result of applying a diff to a program.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedDiff {
    pub program: String,
    pub blocks_found: usize,
    pub blocks_applied: usize,
}

/// Parses and applies SEARCH/REPLACE blocks.
#[derive(Clone, Debug)]
pub struct DiffApplier {
    pattern: Regex,
}

impl DiffApplier {
    pub fn new() -> OracleResult<Self> {
        let pattern = Regex::new(BLOCK_PATTERN)
            .map_err(|e| OracleError::InvalidConfig(format!("diff pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Extract `(search, replace)` pairs from `diff`.
    pub fn blocks(&self, diff: &str) -> Vec<(String, String)> {
        let diff = diff.replace("\r\n", "\n");
        self.pattern
            .captures_iter(&diff)
            .map(|cap| {
                (
                    cap[1].trim_matches('\n').to_string(),
                    cap[2].trim_matches('\n').to_string(),
                )
            })
            .collect()
    }

    /// Apply every block of `diff` to `program`.
    pub fn apply(&self, program: &str, diff: &str) -> AppliedDiff {
        let blocks = self.blocks(diff);
        let mut updated = program.to_string();
        let mut applied = 0;

        for (search, replace) in &blocks {
            if search.is_empty() || !updated.contains(search.as_str()) {
                debug!(search_len = search.len(), "diff block did not match");
                continue;
            }
            updated = updated.replace(search.as_str(), replace);
            applied += 1;
        }

        AppliedDiff {
            program: updated,
            blocks_found: blocks.len(),
            blocks_applied: applied,
        }
    }
}
