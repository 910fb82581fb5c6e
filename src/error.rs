//! Error types for ontotag.

use thiserror::Error;

/// Result type for ontotag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ontotag operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required external collaborator (tokenizer model, ontology source,
    /// similarity oracle) could not be loaded or initialized.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// A vocabulary entry produced no usable signature (for example a name
    /// that is empty after stop-word removal). Index construction skips the
    /// offending variant; this error never aborts a whole build.
    #[error("Malformed vocabulary entry: {0}")]
    MalformedVocabulary(String),

    /// Mutually contradictory or out-of-range configuration options.
    /// Raised at `Extractor` construction, never mid-extraction.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Index serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a dependency-unavailable error.
    pub fn dependency(msg: impl Into<String>) -> Self {
        Error::DependencyUnavailable(msg.into())
    }

    /// Create a malformed-vocabulary error.
    pub fn malformed_vocabulary(msg: impl Into<String>) -> Self {
        Error::MalformedVocabulary(msg.into())
    }

    /// Create an invalid-configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create an invalid-input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
