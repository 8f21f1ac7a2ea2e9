//! Text → word tokens.
//!
//! A token is a maximal run of ASCII letters and digits taken from the
//! lowercased input. Everything else (whitespace, punctuation, non-ASCII
//! characters) separates tokens and is dropped. Order is preserved by
//! [`tokenize`] but discarded by everything downstream of [`token_counts`].

use std::collections::BTreeMap;

/// Split `text` into lowercase alphanumeric tokens.
///
/// Never fails; empty input yields an empty iterator. The returned tokens
/// are owned because lowercasing may change the byte layout of the input.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<String> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect();
    tokens.into_iter()
}

/// Count occurrences of each token in `text`.
#[must_use]
pub fn token_counts(text: &str) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}
