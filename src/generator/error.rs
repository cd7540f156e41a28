//! Generation error types

use thiserror::Error;

/// Generation error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::InvalidRequest, message)
    }

    pub fn empty_output(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::EmptyOutput, message)
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Blocked, message)
    }

    pub fn unknown_topic(technology: &str) -> Self {
        Self::new(
            GenerationErrorKind::UnknownTopic,
            format!("no question available for '{technology}'"),
        )
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Unknown, message)
    }
}

/// Why a generation attempt failed. The caller degrades to the fallback text
/// in every case; the kind exists for the operator log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// Network issues, timeouts
    Network,
    /// Rate limited (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400)
    InvalidRequest,
    /// The backend returned no usable text
    EmptyOutput,
    /// The backend refused to answer (safety filter)
    Blocked,
    /// The offline bank has no entry for the technology
    UnknownTopic,
    /// Unknown error
    Unknown,
}
