//! Smoothed unigram distributions over a shared vocabulary.
//!
//! Divergences are only comparable when every distribution in a scoring
//! call has the same support. [`Distribution::build`] therefore works
//! against a caller-supplied [`Vocabulary`] and widens both sides until
//! their key sets match, then applies add-`smoothing` (Laplace) smoothing so
//! every vocabulary token gets positive mass.

use std::collections::BTreeMap;

use crate::tokenize::{token_counts, tokenize};

/// Default Laplace add-constant.
pub const DEFAULT_SMOOTHING: f64 = 1.0;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Token → count over every channel of one scoring call.
///
/// Only the key set matters to [`Distribution::build`]; the counts are kept
/// for diagnostics. Keys iterate in sorted order so sums over the vocabulary
/// are reproducible.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
    counts: BTreeMap<String, u64>,
}

impl Vocabulary {
    /// An empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the union vocabulary of several texts, summing token counts.
    #[must_use]
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut vocab = Self::new();
        for text in texts {
            vocab.observe(text);
        }
        vocab
    }

    /// Add every token of `text` to the vocabulary.
    pub fn observe(&mut self, text: &str) {
        for token in tokenize(text) {
            *self.counts.entry(token).or_insert(0) += 1;
        }
    }

    /// Make sure `token` is a key, with count 0 if it was absent.
    pub fn ensure(&mut self, token: &str) {
        if !self.counts.contains_key(token) {
            self.counts.insert(token.to_owned(), 0);
        }
    }

    /// Count recorded for `token`, if it is a key.
    #[must_use]
    pub fn count(&self, token: &str) -> Option<u64> {
        self.counts.get(token).copied()
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.counts.contains_key(token)
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Tokens in sorted order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Probability mass per vocabulary token.
///
/// An empty distribution stands for the degenerate case of an empty
/// vocabulary: a single implicit token with probability 1. Two degenerate
/// distributions have zero divergence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Distribution {
    probs: BTreeMap<String, f64>,
}

impl Distribution {
    /// Build the smoothed distribution of `text` over `vocab`.
    ///
    /// Tokens of `text` missing from `vocab` are added to it with count 0,
    /// so after this call the vocabulary's key set is exactly the support of
    /// the returned distribution.
    #[must_use]
    pub fn build(text: &str, vocab: &mut Vocabulary, smoothing: f64) -> Self {
        let mut local = token_counts(text);
        for token in local.keys() {
            vocab.ensure(token);
        }
        for token in vocab.tokens() {
            if !local.contains_key(token) {
                local.insert(token.to_owned(), 0);
            }
        }

        let support = vocab.len().max(1);
        let observed: u64 = local.values().sum();
        #[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
        let total = observed as f64 + smoothing * support as f64;

        let probs = vocab
            .tokens()
            .map(|token| {
                let count = local.get(token).copied().unwrap_or(0);
                #[allow(clippy::cast_precision_loss)]
                let p = (count as f64 + smoothing) / total;
                (token.to_owned(), p)
            })
            .collect();

        Self { probs }
    }

    /// A distribution with exactly the given masses, unnormalized.
    #[cfg(test)]
    pub(crate) fn from_probs<'a>(probs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            probs: probs
                .into_iter()
                .map(|(token, p)| (token.to_owned(), p))
                .collect(),
        }
    }

    /// Build a distribution whose vocabulary is the text's own tokens.
    #[must_use]
    pub fn standalone(text: &str, smoothing: f64) -> Self {
        let mut vocab = Vocabulary::new();
        Self::build(text, &mut vocab, smoothing)
    }

    /// Probability of `token`, or `None` when it is outside the support.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<f64> {
        self.probs.get(token).copied()
    }

    /// `(token, probability)` pairs in sorted token order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.probs.iter().map(|(k, &p)| (k.as_str(), p))
    }

    /// Number of tokens in the support.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// `true` for the empty-vocabulary case.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.probs.is_empty()
    }

    /// Sum of all probabilities (1.0 up to rounding, or 1.0 exactly when
    /// degenerate).
    #[must_use]
    pub fn total_mass(&self) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        self.probs.values().sum()
    }

    /// `true` when both distributions are defined over the same tokens.
    #[must_use]
    pub fn same_support(&self, other: &Self) -> bool {
        self.probs.len() == other.probs.len() && self.probs.keys().eq(other.probs.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn vocabulary_sums_counts_across_texts() {
        let vocab = Vocabulary::from_texts(["a b", "b c", "c c"]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.count("a"), Some(1));
        assert_eq!(vocab.count("b"), Some(2));
        assert_eq!(vocab.count("c"), Some(3));
        assert_eq!(vocab.tokens().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn laplace_smoothing_over_shared_vocab() {
        let mut vocab = Vocabulary::from_texts(["red red blue", "green"]);
        let dist = Distribution::build("red red blue", &mut vocab, 1.0);
        // counts: red 2, blue 1, green 0 → total = 3 + 1·3 = 6
        assert_close(dist.get("red").unwrap(), 3.0 / 6.0);
        assert_close(dist.get("blue").unwrap(), 2.0 / 6.0);
        assert_close(dist.get("green").unwrap(), 1.0 / 6.0);
        assert_close(dist.total_mass(), 1.0);
    }

    #[test]
    fn absent_tokens_still_get_positive_mass() {
        let mut vocab = Vocabulary::from_texts(["alpha", "beta gamma delta"]);
        let dist = Distribution::build("", &mut vocab, 1.0);
        assert_eq!(dist.len(), 4);
        for (_, p) in dist.iter() {
            assert_close(p, 0.25);
        }
    }

    #[test]
    fn tokens_outside_vocab_widen_it() {
        let mut vocab = Vocabulary::from_texts(["one two"]);
        let dist = Distribution::build("two three", &mut vocab, 1.0);
        assert!(vocab.contains("three"));
        assert_eq!(vocab.count("three"), Some(0));
        assert_eq!(vocab.len(), 3);
        assert_eq!(dist.len(), 3);
        assert_close(dist.total_mass(), 1.0);
    }

    #[test]
    fn distributions_over_one_vocab_share_support() {
        let texts = ["intent words here", "understanding words", "action"];
        let mut vocab = Vocabulary::from_texts(texts);
        let dists: Vec<_> = texts
            .iter()
            .map(|t| Distribution::build(t, &mut vocab, 1.0))
            .collect();
        assert!(dists[0].same_support(&dists[1]));
        assert!(dists[1].same_support(&dists[2]));
    }

    #[test]
    fn empty_vocab_is_degenerate() {
        let mut vocab = Vocabulary::new();
        let dist = Distribution::build("", &mut vocab, 1.0);
        assert!(dist.is_degenerate());
        assert_close(dist.total_mass(), 1.0);
    }

    #[test]
    fn smoothing_constant_is_respected() {
        let dist = Distribution::standalone("x x y", 0.5);
        // counts: x 2, y 1 → total = 3 + 0.5·2 = 4
        assert_close(dist.get("x").unwrap(), 2.5 / 4.0);
        assert_close(dist.get("y").unwrap(), 1.5 / 4.0);
    }

    #[test]
    fn standalone_uses_own_tokens() {
        let dist = Distribution::standalone("Hello, hello world", DEFAULT_SMOOTHING);
        assert_eq!(dist.len(), 2);
        assert!(dist.get("hello").unwrap() > dist.get("world").unwrap());
        assert_eq!(dist.get("missing"), None);
    }
}
