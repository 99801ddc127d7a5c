//! Session identity and reward state.
//!
//! A session is a server-tracked conversational context. The backend issues
//! an opaque identifier on resolution; the client treats it as a stable,
//! immutable handle for the lifetime of one activation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Opaque, backend-issued session identifier.
///
/// Stable across channel reconnects. The client never inspects its
/// structure; it is forwarded verbatim to REST calls and the channel URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier carries any content at all.
    ///
    /// A backend that answers with an empty uuid has not established a
    /// session; the resolver treats this the same as a missing one.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A resolved conversational session.
///
/// Immutable once resolved: reconnects and sends within the same activation
/// always use the identifier from the first successful resolution.
/// `created_at` records client-side resolution time (the wire carries none).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Reward counter ("wisdom points") as reported by the backend.
    pub wisdom_points: u32,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Construct a session resolved just now.
    pub fn resolved(id: SessionId, wisdom_points: u32) -> Self {
        Self {
            id,
            wisdom_points,
            created_at: Utc::now(),
        }
    }
}
