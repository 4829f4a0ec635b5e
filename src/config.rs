use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::distance::EditCosts;
use crate::error::{ModelError, Result};

const APP_NAME: &str = "predictext";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Highest n-gram order counted at training time.
    pub max_order: usize,
    /// Minimum corpus frequency for a word to enter the closed vocabulary.
    pub count_threshold: u64,
    /// Additive smoothing constant, strictly positive.
    pub smoothing_k: f64,
    pub suggestion_count: usize,
    pub correction_count: usize,
    pub insertion_cost: u32,
    pub deletion_cost: u32,
    pub substitution_cost: u32,
    pub allow_transpose: bool,
    /// Model order used for perplexity scoring (3 = trigram).
    pub perplexity_order: usize,
    pub model_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_order: 4,
            count_threshold: 2,
            smoothing_k: 1.0,
            suggestion_count: 5,
            correction_count: 3,
            insertion_cost: 1,
            deletion_cost: 1,
            substitution_cost: 2,
            allow_transpose: true,
            perplexity_order: 3,
            model_dir: None,
        }
    }
}

impl Config {
    /// Read the user config, creating it with defaults on first run.
    pub fn load() -> Result<Self> {
        match confy::load::<Config>(APP_NAME, Some("config")) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!("Failed to load config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing_k > 0.0) {
            return Err(ModelError::invalid_argument(format!(
                "smoothing_k must be positive, got {}",
                self.smoothing_k
            )));
        }
        if self.max_order < 2 {
            return Err(ModelError::invalid_argument(
                "max_order must be at least 2",
            ));
        }
        if self.count_threshold == 0 {
            return Err(ModelError::invalid_argument(
                "count_threshold must be at least 1",
            ));
        }
        if self.perplexity_order < 2 || self.perplexity_order > self.max_order {
            return Err(ModelError::invalid_argument(format!(
                "perplexity_order must be in 2..={}, got {}",
                self.max_order, self.perplexity_order
            )));
        }
        Ok(())
    }

    pub fn edit_costs(&self) -> EditCosts {
        EditCosts {
            insertion: self.insertion_cost,
            deletion: self.deletion_cost,
            substitution: self.substitution_cost,
        }
    }

    /// Directory holding the trained artifacts.
    ///
    /// Falls back to the platform data directory, or the working
    /// directory when the platform has none.
    pub fn model_dir(&self) -> PathBuf {
        if let Some(dir) = &self.model_dir {
            return dir.clone();
        }
        match dirs::data_dir() {
            Some(mut path) => {
                path.push(APP_NAME);
                path
            }
            None => PathBuf::from("models"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_smoothing() {
        let config = Config {
            smoothing_k: 0.0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_perplexity_order_above_max() {
        let config = Config {
            max_order: 3,
            perplexity_order: 4,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_model_dir_wins() {
        let config = Config {
            model_dir: Some(PathBuf::from("/tmp/models")),
            ..Config::default()
        };
        assert_eq!(config.model_dir(), PathBuf::from("/tmp/models"));
    }
}
