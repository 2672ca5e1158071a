//! Topic filter translation errors

use thiserror::Error;

/// Reasons a topic filter cannot be compiled into a matcher
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// Empty filter string
    #[error("Topic filter is empty")]
    Empty,

    /// Multi-level wildcard anywhere but as the whole final level
    #[error("Multi-level wildcard must be the last level of '{0}'")]
    MisplacedMultiLevel(String),

    /// The generated pattern was rejected by the regex engine
    #[error("Failed to compile '{filter}': {error}")]
    Regex { filter: String, error: String },
}

/// Result type for filter translation
pub type TranslationResult<T> = Result<T, TranslationError>;
