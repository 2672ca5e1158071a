//! Messaging error types

use crate::matcher::TranslationError;
use thiserror::Error;

/// Errors returned by a messaging client for subscription operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubscriptionError {
    /// Operation attempted before the session was established
    #[error("Not connected to the message broker")]
    NotConnected,

    /// Session already established
    #[error("Already connected to the message broker")]
    AlreadyConnected,

    /// The broker refused the subscription
    #[error("Subscription to '{filter}' rejected: {reason}")]
    Rejected { filter: String, reason: String },

    /// The filter could not be compiled for local dispatch
    #[error("Invalid topic filter: {0}")]
    InvalidFilter(#[from] TranslationError),

    /// Transport-level failure
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for messaging operations
pub type SubscriptionResult<T> = Result<T, SubscriptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SubscriptionError::Rejected {
            filter: "FDPS/position/>".to_string(),
            reason: "ACL denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Subscription to 'FDPS/position/>' rejected: ACL denied"
        );
    }

    #[test]
    fn test_translation_error_conversion() {
        let err: SubscriptionError = TranslationError::Empty.into();
        assert!(matches!(err, SubscriptionError::InvalidFilter(_)));
    }
}
