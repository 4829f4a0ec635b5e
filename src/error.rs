//! Error types shared by training, persistence and serving.
//!
//! Only conditions that must stop the caller are errors. Empty input,
//! an exhausted correction neighbourhood and an unscorable sequence are
//! ordinary results (empty lists or `f64::INFINITY`).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// The model artifact could not be found or opened.
    #[error("model unavailable at {path}: {reason}")]
    ModelUnavailable { path: PathBuf, reason: String },

    /// The artifact decoded but its contents are inconsistent.
    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ModelError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        ModelError::Malformed(msg.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ModelError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
