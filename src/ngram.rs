//! N-gram counting and add-k smoothed probability estimation.
//!
//! # Padding
//!
//! Before counting order `n`, each sentence is padded with `n - 1` start
//! markers and one end marker:
//!
//! ```text
//! order 3:  <s> <s> i like a cat </s>
//!           [<s> <s> i] [<s> i like] [i like a] ... [a cat </s>]
//! ```
//!
//! Orders are counted independently; the order-n table never derives
//! from the order-(n-1) table.
//!
//! # Smoothing
//!
//! For a context of length `m` the probability of `word` is
//!
//! ```text
//! P(word | context) = (count_{m+1}(context + word) + k) / (count_m(context) + k * |V|)
//! ```
//!
//! where `|V|` is the extended vocabulary size (words plus end and unknown
//! markers). With `k > 0` the result is strictly positive for every pair.

use ahash::AHashMap;
use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::vocabulary::{TokenId, Vocabulary, END_ID, START_ID};

/// Occurrence counts for every window of exactly `order` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct NGramCounts {
    order: usize,
    counts: AHashMap<Box<[TokenId]>, u64>,
}

impl NGramCounts {
    pub fn new(order: usize) -> Self {
        Self {
            order,
            counts: AHashMap::new(),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Count of `key`, zero when unseen.
    pub fn count(&self, key: &[TokenId]) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct n-grams.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[TokenId], u64)> {
        self.counts.iter().map(|(k, &c)| (&k[..], c))
    }

    pub(crate) fn add(&mut self, key: &[TokenId], count: u64) {
        *self.counts.entry(key.into()).or_insert(0) += count;
    }
}

/// Count every padded window of length `order` over the encoded sentences.
pub fn count_ngrams(sentences: &[Vec<TokenId>], order: usize) -> Result<NGramCounts> {
    if order == 0 {
        return Err(ModelError::invalid_argument("n-gram order must be at least 1"));
    }

    let mut table = NGramCounts::new(order);
    let mut padded = Vec::new();
    for sentence in sentences {
        padded.clear();
        padded.resize(order - 1, START_ID);
        padded.extend_from_slice(sentence);
        padded.push(END_ID);

        for window in padded.windows(order) {
            table.add(window, 1);
        }
    }

    debug!(order, distinct = table.len(), "counted n-grams");
    Ok(table)
}

/// Smoothed probability of `word` following `context`.
///
/// `context_counts` must be the table of order `context.len()` and
/// `successor_counts` the table of order `context.len() + 1`.
pub fn estimate_probability(
    word: TokenId,
    context: &[TokenId],
    context_counts: &NGramCounts,
    successor_counts: &NGramCounts,
    vocabulary_size: usize,
    k: f64,
) -> f64 {
    let context_count = context_counts.count(context) as f64;
    let denominator = context_count + k * vocabulary_size as f64;

    let mut key = Vec::with_capacity(context.len() + 1);
    key.extend_from_slice(context);
    key.push(word);
    let numerator = successor_counts.count(&key) as f64 + k;

    numerator / denominator
}

/// Probability of every candidate next token (all words, end, unknown)
/// following `context`, in id order.
pub fn estimate_probabilities(
    context: &[TokenId],
    context_counts: &NGramCounts,
    successor_counts: &NGramCounts,
    vocabulary: &Vocabulary,
    k: f64,
) -> Vec<(TokenId, f64)> {
    let size = vocabulary.extended_size();
    vocabulary
        .candidate_ids()
        .map(|id| {
            let p = estimate_probability(id, context, context_counts, successor_counts, size, k);
            (id, p)
        })
        .collect()
}

/// A trained n-gram language model: closed vocabulary plus one count
/// table per order, ascending from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageModel {
    vocabulary: Vocabulary,
    tables: Vec<NGramCounts>,
}

impl LanguageModel {
    /// Assemble a model from parts, checking that tables run 1, 2, .. N.
    pub fn new(vocabulary: Vocabulary, tables: Vec<NGramCounts>) -> Result<Self> {
        if tables.is_empty() {
            return Err(ModelError::invalid_argument("at least one n-gram table is required"));
        }
        for (i, table) in tables.iter().enumerate() {
            if table.order() != i + 1 {
                return Err(ModelError::malformed(format!(
                    "table {} has order {}, expected {}",
                    i,
                    table.order(),
                    i + 1
                )));
            }
        }
        Ok(Self { vocabulary, tables })
    }

    /// Build the vocabulary, replace out-of-vocabulary words and count
    /// orders `1..=max_order`.
    pub fn train(sentences: &[Vec<String>], max_order: usize, threshold: u64) -> Result<Self> {
        if max_order == 0 {
            return Err(ModelError::invalid_argument("max_order must be at least 1"));
        }

        let vocabulary = Vocabulary::build(sentences, threshold);
        let encoded = vocabulary.encode_sentences(sentences);
        let tables = (1..=max_order)
            .map(|order| count_ngrams(&encoded, order))
            .collect::<Result<Vec<_>>>()?;

        info!(
            sentences = sentences.len(),
            vocabulary = vocabulary.len(),
            max_order,
            "trained language model"
        );
        Self::new(vocabulary, tables)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn tables(&self) -> &[NGramCounts] {
        &self.tables
    }

    /// Table of the given order, if it was counted.
    pub fn table(&self, order: usize) -> Option<&NGramCounts> {
        order.checked_sub(1).and_then(|i| self.tables.get(i))
    }

    pub fn max_order(&self) -> usize {
        self.tables.len()
    }

    /// `P(word | context)` using the tables of order `context.len()` and
    /// `context.len() + 1`. Returns `None` when those tables do not exist.
    pub fn probability(&self, word: &str, context: &[&str], k: f64) -> Option<f64> {
        let context_counts = self.table(context.len())?;
        let successor_counts = self.table(context.len() + 1)?;
        let word = self.vocabulary.encode(&[word])[0];
        let context = self.vocabulary.encode(context);
        Some(estimate_probability(
            word,
            &context,
            context_counts,
            successor_counts,
            self.vocabulary.extended_size(),
            k,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|s| s.split_whitespace().map(String::from).collect())
            .collect()
    }

    fn model(raw: &[&str], max_order: usize) -> LanguageModel {
        LanguageModel::train(&sentences(raw), max_order, 1).unwrap()
    }

    #[test]
    fn test_count_bigrams_with_padding() {
        let m = model(&["i like a cat"], 2);
        let v = m.vocabulary();
        let bigrams = m.table(2).unwrap();
        let ids = v.encode(&["i", "like", "a", "cat"]);

        assert_eq!(bigrams.count(&[START_ID, ids[0]]), 1);
        assert_eq!(bigrams.count(&[ids[2], ids[3]]), 1);
        assert_eq!(bigrams.count(&[ids[3], END_ID]), 1);
        assert_eq!(bigrams.len(), 5);
    }

    #[test]
    fn test_unigrams_have_no_start_padding() {
        let m = model(&["a b", "a"], 1);
        let unigrams = m.table(1).unwrap();
        let a = m.vocabulary().id("a").unwrap();

        assert_eq!(unigrams.count(&[a]), 2);
        assert_eq!(unigrams.count(&[END_ID]), 2);
        assert_eq!(unigrams.count(&[START_ID]), 0);
    }

    #[test]
    fn test_empty_sentence_still_counts_end_window() {
        let table = count_ngrams(&[vec![]], 3).unwrap();
        assert_eq!(table.count(&[START_ID, START_ID, END_ID]), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_order_zero_rejected() {
        assert!(count_ngrams(&[vec![3]], 0).is_err());
    }

    #[test]
    fn test_estimate_probability_matches_formula() {
        let m = model(&["i like a cat", "this dog is like a cat"], 2);
        // 'like' occurs twice, always followed by 'a'; |V| = 7 words + 2.
        let p = m.probability("a", &["like"], 1.0).unwrap();
        assert!((p - 3.0 / 11.0).abs() < 1e-12);

        let unseen = m.probability("cat", &["like"], 1.0).unwrap();
        assert!((unseen - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_probability_strictly_positive_for_unseen() {
        let m = model(&["a b c"], 3);
        let p = m.probability("zzz", &["qqq", "rrr"], 0.01).unwrap();
        assert!(p > 0.0);
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let m = model(&["i like a cat", "i like a dog", "a dog is a friend"], 3);
        let v = m.vocabulary();
        for (context, order) in [(vec!["a"], 1), (vec!["like", "a"], 2), (vec!["never", "seen"], 2)] {
            let ctx = v.encode(&context);
            let dist = estimate_probabilities(
                &ctx,
                m.table(order).unwrap(),
                m.table(order + 1).unwrap(),
                v,
                0.5,
            );
            assert_eq!(dist.len(), v.extended_size());
            let total: f64 = dist.iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-9, "context {context:?} sums to {total}");
        }
    }

    #[test]
    fn test_tables_must_ascend() {
        let vocab = Vocabulary::from_words(vec!["a".to_string()]);
        let result = LanguageModel::new(vocab, vec![NGramCounts::new(2)]);
        assert!(matches!(result, Err(ModelError::Malformed(_))));
    }
}
