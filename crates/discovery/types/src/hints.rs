//! Hint text normalization.
//!
//! Two hints are the same hint when they match after lowercasing and
//! collapsing whitespace. Oracles use [`dedupe_hints`] to honour the
//! "never repeat an existing hint" contract.

use std::collections::HashSet;

/// Canonical comparison form: lowercase, single spaces, trimmed.
pub fn normalize_hint(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop hints that are blank, already in `existing`, or repeated within `fresh`.
///
/// Order of the surviving hints is preserved.
pub fn dedupe_hints<S: AsRef<str>>(fresh: Vec<String>, existing: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = existing
        .iter()
        .map(|h| normalize_hint(h.as_ref()))
        .collect();

    fresh
        .into_iter()
        .filter(|hint| {
            let key = normalize_hint(hint);
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}
