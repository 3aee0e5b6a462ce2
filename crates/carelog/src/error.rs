//! Error types for the carelog library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for carelog operations.
#[derive(Debug, Error)]
pub enum CarelogError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// None of the supported encodings could decode the file.
    #[error("Could not decode '{path}' with any supported encoding ({})", tried.join(", "))]
    EncodingUnsupported { path: PathBuf, tried: Vec<String> },

    /// A column the pipeline depends on is absent from the header.
    #[error("Required column '{0}' not found")]
    MissingColumn(String),

    /// Empty file or no header to work with.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error (missing environment values, bad settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The LLM backend failed or answered with something unusable.
    #[error("LLM error ({provider}): {message}")]
    Llm { provider: String, message: String },

    /// The search backend failed.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Error writing pipeline output.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl CarelogError {
    /// Build an [`CarelogError::Llm`] for the named provider.
    pub fn llm(provider: impl Into<String>, message: impl Into<String>) -> Self {
        CarelogError::Llm {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for carelog operations.
pub type Result<T> = std::result::Result<T, CarelogError>;
