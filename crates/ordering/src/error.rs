//! Ordering error types.

use domain::{CartError, DecodeError, SubmissionError};
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    /// A cart precondition was violated.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A scanned table code could not be decoded.
    #[error("{0}")]
    Decode(#[from] DecodeError),

    /// The submission service reported a failure.
    #[error("Order submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

impl OrderingError {
    /// Returns true if the customer can recover by rescanning or retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            OrderingError::Cart(_) => false,
            OrderingError::Decode(_) => true,
            OrderingError::Submission(e) => e.is_retryable(),
        }
    }
}

/// Convenience type alias for ordering results.
pub type Result<T> = std::result::Result<T, OrderingError>;
