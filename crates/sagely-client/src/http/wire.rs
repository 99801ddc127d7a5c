//! Wire shapes for the REST surface.
//!
//! Every field is defaulted so partially-shaped answers degrade to absent
//! values instead of failing the call; the resolver decides what absence
//! means.

use serde::{Deserialize, Serialize};

use sagely_types::message::Message;

/// `GET /session` answer: `{"session": {"uuid": .., "wisdom_points": ..}}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SessionEnvelope {
    #[serde(default)]
    pub session: Option<SessionPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SessionPayload {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub wisdom_points: Option<u32>,
}

/// `POST /message` answer: `{"message": {...}}`, message optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SendEnvelope {
    #[serde(default)]
    pub message: Option<Message>,
}

/// `POST /message` body.
#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    pub text: &'a str,
    #[serde(rename = "sessionId")]
    pub session_id: &'a str,
}
