//! Next-word suggestions.
//!
//! A single order ranks the whole vocabulary by smoothed probability under
//! the most recent `order - 1` context tokens. [`suggest_next`] queries every
//! model from the highest order down to the bigram model and keeps, per word,
//! the largest probability any order assigned to it.
//!
//! Equal probabilities are ordered lexicographically by word.

use std::cmp::Ordering;

use ahash::AHashMap;
use tracing::debug;

use crate::ngram::{estimate_probabilities, NGramCounts};
use crate::vocabulary::{TokenId, Vocabulary, START_ID};

/// Suggestions requested from each order, relative to the final count.
const OVERSAMPLE: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub word: String,
    pub probability: f64,
}

impl Suggestion {
    fn new(word: String, probability: f64) -> Self {
        Self { word, probability }
    }
}

fn by_probability(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.probability
        .total_cmp(&a.probability)
        .then_with(|| a.word.cmp(&b.word))
}

/// Left-pad `context` with start markers and keep the last `len` tokens.
fn active_context(context: &[TokenId], len: usize) -> Vec<TokenId> {
    let mut padded = vec![START_ID; len.saturating_sub(context.len())];
    padded.extend_from_slice(&context[context.len().saturating_sub(len)..]);
    padded
}

/// Rank next words using one model order.
///
/// `context_counts` and `successor_counts` must be adjacent tables; the
/// model order is `successor_counts.order()`. Reserved markers are never
/// suggested. When `prefix` is set only words starting with it are kept.
pub fn suggest_with_order(
    context: &[TokenId],
    context_counts: &NGramCounts,
    successor_counts: &NGramCounts,
    vocabulary: &Vocabulary,
    k: f64,
    top_k: usize,
    prefix: Option<&str>,
) -> Vec<Suggestion> {
    let active = active_context(context, context_counts.order());

    let mut suggestions: Vec<Suggestion> =
        estimate_probabilities(&active, context_counts, successor_counts, vocabulary, k)
            .into_iter()
            .filter(|(id, _)| !Vocabulary::is_reserved(*id))
            .filter_map(|(id, p)| {
                let word = vocabulary.decode(id)?;
                match prefix {
                    Some(prefix) if !word.starts_with(prefix) => None,
                    _ => Some(Suggestion::new(word.to_string(), p)),
                }
            })
            .collect();

    suggestions.sort_by(by_probability);
    suggestions.truncate(top_k);
    suggestions
}

/// Merge suggestions from every model order, highest first, down to bigrams.
///
/// `tables` holds the count tables for orders `1..=N` in ascending order.
/// Each order contributes up to `2 * top_k` candidates; a word keeps the
/// highest probability seen for it.
pub fn suggest_next(
    context: &[TokenId],
    tables: &[NGramCounts],
    vocabulary: &Vocabulary,
    k: f64,
    top_k: usize,
    prefix: Option<&str>,
) -> Vec<Suggestion> {
    if top_k == 0 || tables.len() < 2 {
        return Vec::new();
    }

    let mut best: AHashMap<String, f64> = AHashMap::new();
    for pair in tables.windows(2).rev() {
        let found = suggest_with_order(
            context,
            &pair[0],
            &pair[1],
            vocabulary,
            k,
            top_k.saturating_mul(OVERSAMPLE),
            prefix,
        );
        debug!(order = pair[1].order(), found = found.len(), "order suggestions");

        for suggestion in found {
            best.entry(suggestion.word)
                .and_modify(|p| *p = p.max(suggestion.probability))
                .or_insert(suggestion.probability);
        }
    }

    let mut merged: Vec<Suggestion> = best
        .into_iter()
        .map(|(word, p)| Suggestion::new(word, p))
        .collect();
    merged.sort_by(by_probability);
    merged.truncate(top_k);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngram::LanguageModel;

    fn model(raw: &[&str], max_order: usize) -> LanguageModel {
        let sentences: Vec<Vec<String>> = raw
            .iter()
            .map(|s| s.split_whitespace().map(String::from).collect())
            .collect();
        LanguageModel::train(&sentences, max_order, 1).unwrap()
    }

    #[test]
    fn test_active_context_pads_and_truncates() {
        assert_eq!(active_context(&[7], 3), vec![START_ID, START_ID, 7]);
        assert_eq!(active_context(&[5, 6, 7, 8], 2), vec![7, 8]);
        assert_eq!(active_context(&[5, 6], 0), Vec::<TokenId>::new());
    }

    #[test]
    fn test_trigram_predicts_only_continuation() {
        let m = model(&["i like a cat", "i like a dog"], 3);
        let v = m.vocabulary();
        let context = v.encode(&["i", "like"]);

        let found = suggest_with_order(
            &context,
            m.table(2).unwrap(),
            m.table(3).unwrap(),
            v,
            1.0,
            5,
            None,
        );
        assert_eq!(found[0].word, "a");
        assert!(found[0].probability > found[1].probability);
    }

    #[test]
    fn test_prefix_filter() {
        let m = model(&["i like a cat", "i like a car", "i like a dog"], 2);
        let v = m.vocabulary();
        let context = v.encode(&["a"]);

        let found = suggest_with_order(
            &context,
            m.table(1).unwrap(),
            m.table(2).unwrap(),
            v,
            1.0,
            5,
            Some("ca"),
        );
        let words: Vec<&str> = found.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words, vec!["car", "cat"]);
    }

    #[test]
    fn test_reserved_tokens_never_suggested() {
        let m = model(&["a b", "a b", "a b"], 2);
        let v = m.vocabulary();
        let context = v.encode(&["b"]);
        let found = suggest_next(&context, m.tables(), v, 1.0, 10, None);

        assert!(found.iter().all(|s| s.word != "</s>" && s.word != "<UNK>" && s.word != "<s>"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_suggest_next_is_bounded_distinct_and_sorted() {
        let m = model(
            &[
                "the cat sat on the mat",
                "the dog sat on the rug",
                "a cat and a dog",
                "the cat ran",
            ],
            4,
        );
        let v = m.vocabulary();
        let context = v.encode(&["on", "the"]);
        let found = suggest_next(&context, m.tables(), v, 1.0, 3, None);

        assert_eq!(found.len(), 3);
        for pair in found.windows(2) {
            assert!(pair[0].probability >= pair[1].probability);
            assert_ne!(pair[0].word, pair[1].word);
        }
        assert!(found.iter().any(|s| s.word == "mat" || s.word == "rug"));
    }

    #[test]
    fn test_suggest_next_keeps_max_across_orders() {
        let m = model(&["i like a cat", "i like a dog"], 3);
        let v = m.vocabulary();
        let context = v.encode(&["i", "like"]);

        let merged = suggest_next(&context, m.tables(), v, 1.0, 1, None);
        let trigram = suggest_with_order(
            &context,
            m.table(2).unwrap(),
            m.table(3).unwrap(),
            v,
            1.0,
            1,
            None,
        );
        let bigram = suggest_with_order(
            &context,
            m.table(1).unwrap(),
            m.table(2).unwrap(),
            v,
            1.0,
            1,
            None,
        );

        assert_eq!(merged[0].word, "a");
        let expected = trigram[0].probability.max(bigram[0].probability);
        assert!((merged[0].probability - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ties_break_lexicographically() {
        let v = Vocabulary::from_words(vec!["b".into(), "a".into(), "c".into()]);
        let (unigrams, bigrams) = (NGramCounts::new(1), NGramCounts::new(2));
        let found = suggest_with_order(&[], &unigrams, &bigrams, &v, 1.0, 3, None);
        let words: Vec<&str> = found.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_table_yields_nothing() {
        let m = model(&["a b"], 1);
        let found = suggest_next(&[], m.tables(), m.vocabulary(), 1.0, 5, None);
        assert!(found.is_empty());
    }

    #[test]
    fn test_unbounded_count_returns_whole_vocabulary() {
        let m = model(&["i like a cat", "i like a dog"], 3);
        let v = m.vocabulary();
        let context = v.encode(&["i", "like"]);

        let found = suggest_next(&context, m.tables(), v, 1.0, usize::MAX, None);
        assert_eq!(found.len(), v.len());
        assert_eq!(found[0].word, "a");
    }
}
