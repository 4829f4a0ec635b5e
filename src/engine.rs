//! The serving-time model context.
//!
//! An [`Engine`] owns both trained models and the request settings. It is
//! built once (trained or loaded) and never mutated afterwards, so one
//! instance can be shared by reference across threads without locking.
//!
//! Request methods take raw user text. Empty or whitespace-only input is
//! not an error: it simply yields no suggestions.

use std::path::Path;

use tracing::{debug, info};

use crate::config::Config;
use crate::corrector::{CorrectionModel, CorrectionOptions};
use crate::error::Result;
use crate::ngram::LanguageModel;
use crate::perplexity::sequence_perplexity;
use crate::persistence;
use crate::suggest::{suggest_next, Suggestion};
use crate::tokenizer::{tokenize_words, Tokenizer, WordTokenizer};

/// Per-request knobs, fixed when the engine is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub smoothing_k: f64,
    pub suggestion_count: usize,
    pub correction_count: usize,
    pub perplexity_order: usize,
    pub correction: CorrectionOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            smoothing_k: config.smoothing_k,
            suggestion_count: config.suggestion_count,
            correction_count: config.correction_count,
            perplexity_order: config.perplexity_order,
            correction: CorrectionOptions {
                costs: config.edit_costs(),
                allow_transpose: config.allow_transpose,
            },
        }
    }
}

pub struct Engine<T: Tokenizer = WordTokenizer> {
    language: LanguageModel,
    correction: CorrectionModel,
    settings: Settings,
    tokenizer: T,
}

impl Engine<WordTokenizer> {
    pub fn new(language: LanguageModel, correction: CorrectionModel, settings: Settings) -> Self {
        Self::with_tokenizer(language, correction, settings, WordTokenizer::new())
    }

    /// Train both models from a raw text corpus.
    pub fn train(corpus: &str, config: &Config) -> Result<Self> {
        config.validate()?;
        let tokenizer = WordTokenizer::new();

        let sentences = tokenizer.tokenize(corpus);
        let language = LanguageModel::train(&sentences, config.max_order, config.count_threshold)?;
        let correction = CorrectionModel::from_words(tokenize_words(corpus));

        info!(
            sentences = sentences.len(),
            words = correction.len(),
            "training finished"
        );
        Ok(Self::with_tokenizer(language, correction, Settings::from(config), tokenizer))
    }

    /// Load both artifacts from `dir`. Any failure here must keep the
    /// caller out of serving mode.
    pub fn load(dir: &Path, config: &Config) -> Result<Self> {
        config.validate()?;
        let language = persistence::load_language_model(&persistence::language_model_path(dir))?;
        let correction =
            persistence::load_correction_model(&persistence::correction_model_path(dir))?;
        Ok(Self::new(language, correction, Settings::from(config)))
    }
}

impl<T: Tokenizer> Engine<T> {
    pub fn with_tokenizer(
        language: LanguageModel,
        correction: CorrectionModel,
        settings: Settings,
        tokenizer: T,
    ) -> Self {
        Self {
            language,
            correction,
            settings,
            tokenizer,
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        persistence::save_language_model(&self.language, &persistence::language_model_path(dir))?;
        persistence::save_correction_model(
            &self.correction,
            &persistence::correction_model_path(dir),
        )
    }

    pub fn language_model(&self) -> &LanguageModel {
        &self.language
    }

    pub fn correction_model(&self) -> &CorrectionModel {
        &self.correction
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Tokens of the most recent sentence in `text`.
    fn context_tokens(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(text).pop().unwrap_or_default()
    }

    /// Suggest the next word after `text` using the configured count.
    pub fn suggest(&self, text: &str, prefix: Option<&str>) -> Vec<Suggestion> {
        self.suggest_n(text, prefix, self.settings.suggestion_count)
    }

    pub fn suggest_n(&self, text: &str, prefix: Option<&str>, count: usize) -> Vec<Suggestion> {
        let tokens = self.context_tokens(text);
        if tokens.is_empty() {
            debug!("empty context, no suggestions");
            return Vec::new();
        }

        let prefix = prefix
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());
        let vocabulary = self.language.vocabulary();
        let context = vocabulary.encode(&tokens);

        suggest_next(
            &context,
            self.language.tables(),
            vocabulary,
            self.settings.smoothing_k,
            count,
            prefix.as_deref(),
        )
    }

    /// Spelling corrections for a single word using the configured count.
    pub fn correct(&self, word: &str) -> Vec<String> {
        self.correct_n(word, self.settings.correction_count)
    }

    pub fn correct_n(&self, word: &str, count: usize) -> Vec<String> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return Vec::new();
        }
        self.correction
            .correct(&word, count, &self.settings.correction)
    }

    /// Perplexity of `text` under the configured model order.
    ///
    /// `None` for empty input; `Some(f64::INFINITY)` when the model has no
    /// tables for the order.
    pub fn perplexity(&self, text: &str) -> Option<f64> {
        self.perplexity_with_order(text, self.settings.perplexity_order)
    }

    pub fn perplexity_with_order(&self, text: &str, order: usize) -> Option<f64> {
        let tokens = self.context_tokens(text);
        if tokens.is_empty() {
            return None;
        }

        let context_counts = order.checked_sub(1).and_then(|m| self.language.table(m));
        let successor_counts = self.language.table(order);
        let (Some(context_counts), Some(successor_counts)) = (context_counts, successor_counts)
        else {
            debug!(order, "no tables for requested order");
            return Some(f64::INFINITY);
        };

        let vocabulary = self.language.vocabulary();
        Some(sequence_perplexity(
            &vocabulary.encode(&tokens),
            context_counts,
            successor_counts,
            vocabulary.extended_size(),
            self.settings.smoothing_k,
        ))
    }
}
