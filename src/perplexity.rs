//! Sequence perplexity under one model order.

use tracing::debug;

use crate::ngram::{estimate_probability, NGramCounts};
use crate::vocabulary::{TokenId, END_ID, START_ID};

/// Perplexity of `tokens` under the model formed by `context_counts`
/// (order `m`) and `successor_counts` (order `m + 1`).
///
/// The sequence is padded with `m` start markers and one end marker; every
/// real token and the end marker is scored against its preceding `m`
/// tokens. The result is the geometric mean of the inverse probabilities,
/// accumulated in log space so long sequences do not overflow.
///
/// Returns `f64::INFINITY` when the successor table is empty or a
/// probability is zero or undefined (only possible with `k == 0`).
pub fn sequence_perplexity(
    tokens: &[TokenId],
    context_counts: &NGramCounts,
    successor_counts: &NGramCounts,
    vocabulary_size: usize,
    k: f64,
) -> f64 {
    if successor_counts.is_empty() {
        return f64::INFINITY;
    }

    let m = context_counts.order();
    let mut padded = vec![START_ID; m];
    padded.extend_from_slice(tokens);
    padded.push(END_ID);

    let scored = padded.len() - m;
    let mut log_sum = 0.0;
    for t in m..padded.len() {
        let p = estimate_probability(
            padded[t],
            &padded[t - m..t],
            context_counts,
            successor_counts,
            vocabulary_size,
            k,
        );
        if !(p > 0.0) {
            return f64::INFINITY;
        }
        log_sum -= p.ln();
    }

    let perplexity = (log_sum / scored as f64).exp();
    debug!(order = m + 1, scored, perplexity, "scored sequence");
    perplexity
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
    fn test_matches_direct_product() {
        let m = model(&["i like a cat", "this dog is like a cat"], 2);
        let v = m.vocabulary();
        let (uni, bi) = (m.table(1).unwrap(), m.table(2).unwrap());
        let tokens = v.encode(&["i", "like", "a", "cat"]);
        let size = v.extended_size();

        let mut padded = vec![START_ID];
        padded.extend_from_slice(&tokens);
        padded.push(END_ID);
        let mut product = 1.0;
        for t in 1..padded.len() {
            product /= estimate_probability(padded[t], &padded[t - 1..t], uni, bi, size, 1.0);
        }
        let expected = product.powf(1.0 / 5.0);

        let got = sequence_perplexity(&tokens, uni, bi, size, 1.0);
        assert!((got - expected).abs() < 1e-9, "{got} vs {expected}");
    }

    #[test]
    fn test_seen_sentence_scores_lower_than_scrambled() {
        let m = model(&["i like a cat", "i like a dog", "you like a cat"], 3);
        let v = m.vocabulary();
        let (bi, tri) = (m.table(2).unwrap(), m.table(3).unwrap());
        let size = v.extended_size();

        let seen = sequence_perplexity(&v.encode(&["i", "like", "a", "cat"]), bi, tri, size, 1.0);
        let scrambled = sequence_perplexity(&v.encode(&["cat", "a", "i", "like"]), bi, tri, size, 1.0);
        assert!(seen < scrambled);
    }

    #[test]
    fn test_unknown_tokens_give_finite_perplexity() {
        let m = model(&["the quick brown fox", "jumps over the lazy dog"], 3);
        let v = m.vocabulary();
        let tokens = v.encode(&["completely", "disjoint", "words"]);

        let p = sequence_perplexity(
            &tokens,
            m.table(2).unwrap(),
            m.table(3).unwrap(),
            v.extended_size(),
            1.0,
        );
        assert!(p.is_finite());
        assert!(p > 1.0);
    }

    #[test]
    fn test_empty_successor_table_is_unscorable() {
        let p = sequence_perplexity(&[3, 4], &NGramCounts::new(1), &NGramCounts::new(2), 10, 1.0);
        assert!(p.is_infinite());
    }

    #[test]
    fn test_zero_smoothing_on_unseen_is_unscorable() {
        let m = model(&["a b"], 2);
        let v = m.vocabulary();
        let tokens = v.encode(&["b", "a"]);
        let p = sequence_perplexity(&tokens, m.table(1).unwrap(), m.table(2).unwrap(), v.extended_size(), 0.0);
        assert!(p.is_infinite());
    }
}
