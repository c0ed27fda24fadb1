//! Error types for the control client.
//!
//! The taxonomy is closed: every failure of a control or status request is
//! one of the four kinds below. The client never recovers from them itself;
//! the polling state machine decides what a failure means for the UI.

use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Boxed cause of a transport failure.
pub type TransportCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when talking to the control API.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The endpoint could not be built from configuration.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The request could not be sent or the response could not be read.
    #[error("transport failure: {0}")]
    TransportFailure(#[source] TransportCause),

    /// The server answered outside the 2xx range.
    #[error("unexpected status code: {0}")]
    UnexpectedStatusCode(u16),

    /// The body was not a JSON object with a string `message`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ControlError {
    /// Wrap a transport-level cause.
    pub fn transport(cause: impl Into<TransportCause>) -> Self {
        Self::TransportFailure(cause.into())
    }

    /// The HTTP status code behind this error, if the server answered.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatusCode(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns true if the next scheduled check might succeed.
    ///
    /// Configuration problems and client errors (4xx) will not go away on
    /// their own; transport failures and server errors might.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::TransportFailure(_) => true,
            Self::UnexpectedStatusCode(code) => *code >= 500,
            Self::InvalidEndpoint(_) | Self::MalformedResponse(_) => false,
        }
    }
}
