//! Common error types for vpn-toggle.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised when parsing core types from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The text does not name a known resource state.
    #[error("unknown resource state: {0}")]
    UnknownState(String),

    /// The text does not name a known control action.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// An invalid identifier was provided.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] crate::ids::IdError),
}
