//! Splitting raw text into lowercase word tokens.
//!
//! Training and serving only depend on the [`Tokenizer`] trait, so any
//! tokenizer that produces sentences of lowercase words can be swapped in.
//! [`WordTokenizer`] treats every non-empty line as a sentence and uses
//! Unicode word boundaries (UAX #29) inside each line.

use unicode_segmentation::UnicodeSegmentation;

/// Turns raw text into a sequence of token sequences, one per sentence.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        WordTokenizer
    }

    fn words(line: &str) -> Vec<String> {
        line.unicode_words()
            .filter(|w| w.chars().any(char::is_alphanumeric))
            .map(str::to_lowercase)
            .collect()
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Vec<String>> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Self::words)
            .filter(|words| !words.is_empty())
            .collect()
    }
}

/// Flatten text into a single stream of lowercase words.
pub fn tokenize_words(text: &str) -> Vec<String> {
    WordTokenizer::words(text)
}
