//! Error taxonomy for the chat/session core.
//!
//! Each boundary gets its own enum so callers can match on what actually
//! went wrong. Only resolution and send failures propagate to consumers;
//! bootstrap, channel, and storage failures are absorbed where they occur.

use thiserror::Error;

/// Errors from REST calls against the backend.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status. `message` carries the backend's own error
    /// text when the body was a JSON object with a `message` field.
    #[error("backend returned status {status}")]
    Status { status: u16, message: Option<String> },

    /// The body decoded as JSON but was not the expected shape
    /// (e.g. a bootstrap endpoint answering with a non-list).
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// User-facing text for the notification surface.
    ///
    /// Prefers the backend-supplied message when one was present in the
    /// error body; falls back to a generic line naming the operation.
    pub fn user_message(&self, context: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Status { status, .. } => {
                format!("API call failed during {context}. Status: {status}")
            }
            ApiError::Network(reason) => {
                format!("API call failed during {context}: {reason}")
            }
            other => format!("An unexpected client error occurred: {other}"),
        }
    }
}

/// Errors establishing a session.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The backend answered without a usable session identifier. Fatal to
    /// this activation; dependent components never start.
    #[error("backend did not return a session id")]
    MissingSessionId,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors from the send path.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    #[error("cannot send: no session has been resolved")]
    SessionUnresolved,

    #[error("cannot send an empty message")]
    EmptyMessage,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors from the push-channel transport.
#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    #[error("channel connect failed: {0}")]
    Connect(String),

    #[error("channel transport error: {0}")]
    Transport(String),
}

/// Errors from the client-side durable store (session id / credential
/// cache). Always tolerated by callers: the cache is best-effort.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(String),

    #[error("store contents malformed: {0}")]
    Malformed(String),
}
