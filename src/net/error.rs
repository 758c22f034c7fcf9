//! API error type and the normalization of collaborator error shapes.
//!
//! ERROR HANDLING
//! ==============
//! Every failure surfaced by the transport lands in [`ApiError`]. Consumers
//! that show messages call [`ApiError::messages`], which flattens the
//! service's `{message: string | string[]}` body into one list; callers
//! supply their own fallback when that list is empty.

use super::token::TokenError;
use super::types::ErrorBody;

/// Coarse error class, used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input detected locally; no request was sent.
    Validation,
    /// The service rejected the credentials or session token.
    Authentication,
    /// The service was unreachable or answered something unreadable.
    Transport,
    /// Any other rejection of a board or content operation.
    Operation,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid input: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("authentication rejected (status {status})")]
    Unauthorized { status: u16, messages: Vec<String> },

    #[error("request rejected (status {status})")]
    Rejected { status: u16, messages: Vec<String> },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("session token store failed: {0}")]
    Token(#[from] TokenError),
}

impl ApiError {
    /// Build an error from a non-2xx response, parsing the `{message}` body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let messages = serde_json::from_str::<ErrorBody>(body)
            .map(|parsed| parsed.message.map(super::types::MessageField::into_messages).unwrap_or_default())
            .unwrap_or_default();
        if status == 401 {
            Self::Unauthorized { status, messages }
        } else {
            Self::Rejected { status, messages }
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Authentication,
            Self::Rejected { .. } => ErrorKind::Operation,
            Self::Transport(_) | Self::Decode(_) | Self::HttpClientBuild(_) | Self::Token(_) => ErrorKind::Transport,
        }
    }

    /// HTTP status, when the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// User-facing messages carried by the error. Empty for transport failures.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages)
            | Self::Unauthorized { messages, .. }
            | Self::Rejected { messages, .. } => messages.clone(),
            _ => Vec::new(),
        }
    }

    /// [`Self::messages`], or `fallback` alone when there are none.
    #[must_use]
    pub fn messages_or(&self, fallback: &str) -> Vec<String> {
        let messages = self.messages();
        if messages.is_empty() { vec![fallback.to_owned()] } else { messages }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
