//! Saving and loading trained model artifacts.
//!
//! Both artifacts are bincode-encoded and written through a temporary file
//! in the destination directory, then renamed into place, so a reader never
//! observes a half-written model. Loading validates every invariant the
//! serving code relies on and reports violations as [`ModelError::Malformed`].

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use ahash::{AHashMap, AHashSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::corrector::CorrectionModel;
use crate::error::{ModelError, Result};
use crate::ngram::{LanguageModel, NGramCounts};
use crate::vocabulary::{TokenId, Vocabulary};

pub const LANGUAGE_MODEL_FILE: &str = "language_model.bin";
pub const CORRECTION_MODEL_FILE: &str = "correction_model.bin";

#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    order: usize,
    entries: Vec<(Vec<TokenId>, u64)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguageModelArtifact {
    vocabulary: Vec<String>,
    ngram_tables: Vec<TableRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CorrectionModelArtifact {
    vocabulary: Vec<String>,
    probabilities: Vec<(String, f64)>,
}

impl LanguageModelArtifact {
    fn from_model(model: &LanguageModel) -> Self {
        let ngram_tables = model
            .tables()
            .iter()
            .map(|table| {
                let mut entries: Vec<(Vec<TokenId>, u64)> =
                    table.iter().map(|(key, count)| (key.to_vec(), count)).collect();
                entries.sort_unstable();
                TableRecord {
                    order: table.order(),
                    entries,
                }
            })
            .collect();

        Self {
            vocabulary: model.vocabulary().words().to_vec(),
            ngram_tables,
        }
    }

    fn into_model(self) -> Result<LanguageModel> {
        // Ids are positional, so the stored list must already be in the
        // canonical order `from_words` would produce.
        let vocabulary = Vocabulary::from_words(self.vocabulary.iter().cloned());
        if vocabulary.words() != self.vocabulary.as_slice() {
            return Err(ModelError::malformed(
                "vocabulary is not sorted and unique, or contains reserved markers",
            ));
        }
        if self.ngram_tables.is_empty() {
            return Err(ModelError::malformed("no n-gram tables"));
        }

        let bound = vocabulary.id_bound() as TokenId;
        let mut tables = Vec::with_capacity(self.ngram_tables.len());
        for record in self.ngram_tables {
            let mut table = NGramCounts::new(record.order);
            for (key, count) in record.entries {
                if key.len() != record.order {
                    return Err(ModelError::malformed(format!(
                        "{}-gram table holds a key of length {}",
                        record.order,
                        key.len()
                    )));
                }
                if count == 0 {
                    return Err(ModelError::malformed("n-gram with zero count"));
                }
                if key.iter().any(|&id| id >= bound) {
                    return Err(ModelError::malformed("token id outside the vocabulary"));
                }
                table.add(&key, count);
            }
            tables.push(table);
        }

        LanguageModel::new(vocabulary, tables)
    }
}

impl CorrectionModelArtifact {
    fn from_model(model: &CorrectionModel) -> Self {
        let mut vocabulary: Vec<String> = model.vocabulary().iter().cloned().collect();
        vocabulary.sort_unstable();
        let mut probabilities: Vec<(String, f64)> = model
            .probabilities()
            .iter()
            .map(|(w, &p)| (w.clone(), p))
            .collect();
        probabilities.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Self {
            vocabulary,
            probabilities,
        }
    }

    fn into_model(self) -> Result<CorrectionModel> {
        if let Some((word, p)) = self
            .probabilities
            .iter()
            .find(|(_, p)| !(0.0..=1.0).contains(p))
        {
            return Err(ModelError::malformed(format!(
                "probability {p} for '{word}' is outside [0, 1]"
            )));
        }
        let vocabulary: AHashSet<String> = self.vocabulary.into_iter().collect();
        let probabilities: AHashMap<String, f64> = self.probabilities.into_iter().collect();
        Ok(CorrectionModel::new(vocabulary, probabilities))
    }
}

fn write_atomic<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        bincode::serialize_into(&mut writer, value)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| ModelError::ModelUnavailable {
        path: path.to_path_buf(),
        reason: match e.kind() {
            ErrorKind::NotFound => "file not found, train a model first".to_string(),
            _ => e.to_string(),
        },
    })?;
    bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| ModelError::malformed(format!("{}: {e}", path.display())))
}

pub fn save_language_model(model: &LanguageModel, path: &Path) -> Result<()> {
    write_atomic(&LanguageModelArtifact::from_model(model), path)?;
    info!(path = %path.display(), "saved language model");
    Ok(())
}

pub fn load_language_model(path: &Path) -> Result<LanguageModel> {
    let model = read_artifact::<LanguageModelArtifact>(path)?.into_model()?;
    info!(
        path = %path.display(),
        vocabulary = model.vocabulary().len(),
        max_order = model.max_order(),
        "loaded language model"
    );
    Ok(model)
}

pub fn save_correction_model(model: &CorrectionModel, path: &Path) -> Result<()> {
    write_atomic(&CorrectionModelArtifact::from_model(model), path)?;
    info!(path = %path.display(), "saved correction model");
    Ok(())
}

pub fn load_correction_model(path: &Path) -> Result<CorrectionModel> {
    let model = read_artifact::<CorrectionModelArtifact>(path)?.into_model()?;
    info!(path = %path.display(), words = model.len(), "loaded correction model");
    Ok(model)
}

pub fn language_model_path(dir: &Path) -> PathBuf {
    dir.join(LANGUAGE_MODEL_FILE)
}

pub fn correction_model_path(dir: &Path) -> PathBuf {
    dir.join(CORRECTION_MODEL_FILE)
}
