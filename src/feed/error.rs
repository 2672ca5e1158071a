//! Feed error types

use thiserror::Error;

/// Errors raised while parsing a flight position topic
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    /// The topic does not have the flight position level count
    #[error("Expected {expected} topic levels, found {found}")]
    WrongSegmentCount { expected: usize, found: usize },

    /// A numeric level could not be parsed
    #[error("Invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
