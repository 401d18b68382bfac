//! Error types for the craftform client.

use thiserror::Error;

use crate::context::CancelReason;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the resource API.
#[derive(Error, Debug)]
pub enum Error {
    /// The service answered 401.
    #[error("unauthorized")]
    Unauthorized,

    /// The service answered 404.
    #[error("resource not found")]
    NotFound,

    /// The configured base address (or a relative path) could not be parsed.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// A response body did not match the expected shape.
    #[error("failed to decode response: {reason}")]
    Decode { reason: String },

    /// The service returned a structured error payload.
    #[error("{message}")]
    Remote { message: String },

    /// The service returned an error without a usable payload.
    #[error("{status}")]
    Status { status: String },

    /// The caller's context ended before the call completed.
    #[error("request aborted: {reason}")]
    Cancelled { reason: CancelReason },

    /// A request body or query string could not be encoded.
    #[error("failed to encode request: {reason}")]
    Encode { reason: String },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid address error.
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create a remote error from an already joined message.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Create a raw status error.
    pub fn status(status: impl Into<String>) -> Self {
        Self::Status {
            status: status.into(),
        }
    }

    /// Create a cancellation error.
    pub const fn cancelled(reason: CancelReason) -> Self {
        Self::Cancelled { reason }
    }

    /// Create an encode error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// Create a config error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Whether the service reported the resource as absent.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Whether the caller's context ended the call.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
