//! Spelling correction over a frequency-weighted vocabulary.
//!
//! Candidates come from three tiers:
//!
//! 1. the word itself, when it is in the vocabulary
//! 2. vocabulary words one edit away
//! 3. vocabulary words two edits away, only when tiers 1 and 2 are both empty
//!
//! Tiers 1 and 2 are merged before deciding whether to fall back. Every
//! candidate is ranked by weighted edit distance (ascending), then unigram
//! probability (descending), then the word itself.

use ahash::{AHashMap, AHashSet};
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::distance::{min_edit_distance, EditCosts};
use crate::edits::{edit_one, edit_two};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionOptions {
    pub costs: EditCosts,
    pub allow_transpose: bool,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            costs: EditCosts::default(),
            allow_transpose: true,
        }
    }
}

/// A ranked correction candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub word: String,
    pub distance: u32,
    pub probability: f64,
}

impl Candidate {
    fn new(word: String, distance: u32, probability: f64) -> Self {
        Self { word, distance, probability }
    }
}

fn by_rank(a: &Candidate, b: &Candidate) -> Ordering {
    a.distance
        .cmp(&b.distance)
        .then_with(|| b.probability.total_cmp(&a.probability))
        .then_with(|| a.word.cmp(&b.word))
}

/// Known words and their unigram probabilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionModel {
    vocabulary: AHashSet<String>,
    probabilities: AHashMap<String, f64>,
}

impl CorrectionModel {
    pub fn new(vocabulary: AHashSet<String>, probabilities: AHashMap<String, f64>) -> Self {
        Self { vocabulary, probabilities }
    }

    /// Build from raw occurrence counts: `p(word) = count / total`.
    pub fn from_counts(counts: AHashMap<String, u64>) -> Self {
        let total: u64 = counts.values().sum();
        let probabilities = counts
            .iter()
            .map(|(word, &count)| (word.clone(), count as f64 / total as f64))
            .collect();
        let vocabulary = counts.into_iter().map(|(word, _)| word).collect();
        Self { vocabulary, probabilities }
    }

    /// Count a word stream and build the model from it.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: AHashMap<String, u64> = AHashMap::new();
        for word in words {
            *counts.entry(word.into()).or_insert(0) += 1;
        }
        let model = Self::from_counts(counts);
        info!(words = model.len(), "built correction model");
        model
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    /// Unigram probability, zero for unknown words.
    pub fn probability(&self, word: &str) -> f64 {
        self.probabilities.get(word).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn vocabulary(&self) -> &AHashSet<String> {
        &self.vocabulary
    }

    pub fn probabilities(&self) -> &AHashMap<String, f64> {
        &self.probabilities
    }

    fn known(&self, candidates: AHashSet<String>) -> impl Iterator<Item = String> + '_ {
        candidates.into_iter().filter(|w| self.vocabulary.contains(w))
    }

    /// Ranked candidates with their distance and probability.
    pub fn candidates(&self, word: &str, options: &CorrectionOptions) -> Vec<Candidate> {
        if word.trim().is_empty() {
            return Vec::new();
        }

        let mut found: AHashSet<String> = AHashSet::new();
        if self.contains(word) {
            found.insert(word.to_string());
        }
        found.extend(self.known(edit_one(word, options.allow_transpose)));

        if found.is_empty() {
            found.extend(self.known(edit_two(word, options.allow_transpose)));
        }

        let mut ranked: Vec<Candidate> = found
            .into_iter()
            .map(|candidate| {
                let distance = min_edit_distance(word, &candidate, &options.costs);
                let probability = self.probability(&candidate);
                Candidate::new(candidate, distance, probability)
            })
            .collect();
        ranked.sort_by(by_rank);

        debug!(word, candidates = ranked.len(), "ranked corrections");
        ranked
    }

    /// The `top_k` best corrections for `word`. Empty when nothing within
    /// two edits is known.
    pub fn correct(&self, word: &str, top_k: usize, options: &CorrectionOptions) -> Vec<String> {
        self.candidates(word, options)
            .into_iter()
            .take(top_k)
            .map(|c| c.word)
            .collect()
    }
}
