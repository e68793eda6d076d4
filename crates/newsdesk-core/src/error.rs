//! Error types for the Newsdesk state layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Newsdesk state layer.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Authentication flows map
/// these into fixed user-facing messages; content operations surface the
/// upstream detail carried by `Upstream`.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum NewsdeskError {
    /// The operation requires an authenticated session and none exists.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The remote CMS returned a failure payload or a non-success status.
    #[error("Upstream rejected the request: {message}")]
    Upstream { message: String },

    /// The request never completed (connect failure, timeout, DNS, ...).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The remote CMS answered with a shape this layer does not recognize.
    #[error("Malformed response: {context}")]
    Malformed { context: String },

    /// The persisted session snapshot could not be read back.
    #[error("Persisted session state is corrupt: {message}")]
    PersistedState { message: String },

    /// IO error (snapshot storage operations).
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NewsdeskError {
    /// Creates an Upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Creates a Network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a Malformed error.
    pub fn malformed(context: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
        }
    }

    /// Creates a PersistedState error.
    pub fn persisted_state(message: impl Into<String>) -> Self {
        Self::PersistedState {
            message: message.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotAuthenticated error.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }

    /// Check if this is an Upstream error.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Check if this is a PersistedState error.
    pub fn is_persisted_state(&self) -> bool {
        matches!(self, Self::PersistedState { .. })
    }

    /// The message shown to content-editing UIs.
    ///
    /// Upstream detail is surfaced verbatim; everything else collapses to
    /// the error's display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Upstream { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for NewsdeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for NewsdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, NewsdeskError>`.
pub type Result<T> = std::result::Result<T, NewsdeskError>;
