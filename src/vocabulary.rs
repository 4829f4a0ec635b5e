//! Closed vocabulary construction and token interning.
//!
//! Every token the language model sees is interned to a small integer
//! [`TokenId`]. The three reserved markers always occupy the first ids;
//! closed-vocabulary words follow in lexicographic order so that the same
//! corpus always produces the same ids.
//!
//! ```text
//! id 0  <s>     sentence start (context padding only)
//! id 1  </s>    sentence end
//! id 2  <UNK>   out-of-vocabulary replacement
//! id 3.. words  frequency >= threshold, sorted
//! ```

use ahash::AHashMap;

pub type TokenId = u32;

pub const START_TOKEN: &str = "<s>";
pub const END_TOKEN: &str = "</s>";
pub const UNKNOWN_TOKEN: &str = "<UNK>";

pub const START_ID: TokenId = 0;
pub const END_ID: TokenId = 1;
pub const UNKNOWN_ID: TokenId = 2;

const RESERVED: [&str; 3] = [START_TOKEN, END_TOKEN, UNKNOWN_TOKEN];

/// Count how often each token occurs across all sentences.
pub fn count_words(sentences: &[Vec<String>]) -> AHashMap<String, u64> {
    let mut counts = AHashMap::new();
    for sentence in sentences {
        for token in sentence {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: AHashMap<String, TokenId>,
}

impl Vocabulary {
    /// Build the closed vocabulary: every token seen at least `threshold` times.
    pub fn build(sentences: &[Vec<String>], threshold: u64) -> Self {
        let words = count_words(sentences)
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(word, _)| word);
        Self::from_words(words)
    }

    /// Intern an explicit word list. Reserved markers and duplicates are ignored.
    pub fn from_words<I>(words: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .filter(|w| !RESERVED.contains(&w.as_str()))
            .collect();
        words.sort_unstable();
        words.dedup();

        let tokens: Vec<String> = RESERVED
            .iter()
            .map(|t| t.to_string())
            .chain(words)
            .collect();
        let ids = tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id as TokenId))
            .collect();

        Self { tokens, ids }
    }

    /// Closed-vocabulary words, without the reserved markers.
    pub fn words(&self) -> &[String] {
        &self.tokens[RESERVED.len()..]
    }

    /// Number of closed-vocabulary words.
    pub fn len(&self) -> usize {
        self.tokens.len() - RESERVED.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the candidate space used as the smoothing multiplier:
    /// every word plus the end and unknown markers.
    pub fn extended_size(&self) -> usize {
        self.len() + 2
    }

    /// Ids eligible as a next word: all words, the end and the unknown marker.
    /// The start marker never follows anything.
    pub fn candidate_ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        END_ID..self.tokens.len() as TokenId
    }

    pub fn contains(&self, word: &str) -> bool {
        self.ids.get(word).is_some_and(|&id| id > UNKNOWN_ID)
    }

    pub fn id(&self, token: &str) -> Option<TokenId> {
        self.ids.get(token).copied()
    }

    /// The token interned as `id`, reserved markers included.
    pub fn decode(&self, id: TokenId) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Total number of interned ids, reserved markers included.
    pub fn id_bound(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_reserved(id: TokenId) -> bool {
        id <= UNKNOWN_ID
    }

    /// Map tokens to ids, sending anything unknown to [`UNKNOWN_ID`].
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<TokenId> {
        tokens
            .iter()
            .map(|t| self.id(t.as_ref()).unwrap_or(UNKNOWN_ID))
            .collect()
    }

    pub fn encode_sentences(&self, sentences: &[Vec<String>]) -> Vec<Vec<TokenId>> {
        sentences.iter().map(|s| self.encode(s)).collect()
    }

    /// Rewrite every out-of-vocabulary token to the unknown marker.
    pub fn replace_oov(&self, sentences: &[Vec<String>]) -> Vec<Vec<String>> {
        sentences
            .iter()
            .map(|sentence| {
                sentence
                    .iter()
                    .map(|token| {
                        if self.contains(token) {
                            token.clone()
                        } else {
                            UNKNOWN_TOKEN.to_string()
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
