//! Predictext - next-word prediction and spelling correction.
//!
//! # Overview
//!
//! Two independent capabilities share one trained corpus:
//!
//! - **Prediction**: an n-gram language model with add-k smoothing ranks
//!   the next word given the words typed so far, merging every model order
//!   from the highest down to bigrams.
//! - **Correction**: words one (or, failing that, two) edits away from the
//!   input are looked up in a frequency-weighted vocabulary and ranked by
//!   weighted edit distance, then frequency.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Tokenizer   │ ──▶ │  Vocabulary  │ ──▶ │ N-gram counts│
//! └──────┬───────┘     └──────────────┘     └──────┬───────┘
//!        │                                         │
//!        ▼                                         ▼
//! ┌──────────────┐                         ┌──────────────┐
//! │ Correction   │ ◀── edits + distance    │ Suggestions  │
//! │ model        │                         │ / perplexity │
//! └──────┬───────┘                         └──────┬───────┘
//!        └──────────────▶  Engine  ◀──────────────┘
//! ```
//!
//! # Modules
//!
//! - `tokenizer`: raw text to lowercase word sentences
//! - `vocabulary`: closed vocabulary and token interning
//! - `ngram`: count tables, smoothed probabilities, the language model
//! - `suggest`: single-order ranking and multi-order merging
//! - `perplexity`: sequence scoring
//! - `edits`: one- and two-edit candidate generation
//! - `distance`: weighted minimum edit distance
//! - `corrector`: correction model and ranking
//! - `persistence`: bincode artifacts with atomic writes
//! - `engine`: immutable serving context
//! - `config`: user configuration

pub mod config;
pub mod corrector;
pub mod distance;
pub mod edits;
pub mod engine;
pub mod error;
pub mod ngram;
pub mod perplexity;
pub mod persistence;
pub mod suggest;
pub mod tokenizer;
pub mod vocabulary;

pub use config::Config;
pub use corrector::{Candidate, CorrectionModel, CorrectionOptions};
pub use distance::{edit_distance_matrix, min_edit_distance, EditCosts, EditDistance};
pub use edits::{edit_one, edit_two};
pub use engine::{Engine, Settings};
pub use error::{ModelError, Result};
pub use ngram::{count_ngrams, estimate_probabilities, estimate_probability, LanguageModel, NGramCounts};
pub use perplexity::sequence_perplexity;
pub use suggest::{suggest_next, suggest_with_order, Suggestion};
pub use tokenizer::{Tokenizer, WordTokenizer};
pub use vocabulary::{TokenId, Vocabulary};
