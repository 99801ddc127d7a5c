//! RestBackend -- concrete [`BackendApi`] implementation over reqwest.
//!
//! Talks to the learning backend's REST surface. The bearer credential,
//! when present, is attached to every request and never logged. Error
//! bodies shaped `{"message": "..."}` surface the backend's own text.
//!
//! No request timeout is set here: a hung request parks the caller (and
//! leaves the thinking indicator set) by contract.

mod wire;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use sagely_core::backend::{BackendApi, ResolvedSession};
use sagely_types::error::ApiError;
use sagely_types::learning::{Lesson, LearningTarget};
use sagely_types::message::Message;
use sagely_types::session::SessionId;

use wire::{SendRequest, SendEnvelope, SessionEnvelope};

/// REST client for the learning backend.
pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl RestBackend {
    /// Create a backend client for `base_url` (e.g.
    /// `http://localhost:3000/api/v1`). `token` is the cached bearer
    /// credential, attached to every call when present.
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sagely/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to create reqwest client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and decode the body as JSON, mapping transport and
    /// status failures into [`ApiError`].
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The backend puts its error text on a `message` field when the
            // body is JSON; anything else degrades to the bare status.
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                });
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

impl BackendApi for RestBackend {
    async fn resolve_session(
        &self,
        cached: Option<&SessionId>,
    ) -> Result<ResolvedSession, ApiError> {
        let mut request = self.http.get(format!("{}/session", self.base_url));
        if let Some(id) = cached {
            request = request.query(&[("sessionId", id.as_str())]);
        }

        let value = self.execute(request).await?;
        let envelope: SessionEnvelope = match serde_json::from_value(value) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "session envelope in unexpected shape");
                SessionEnvelope::default()
            }
        };

        let payload = envelope.session.unwrap_or_default();
        Ok(ResolvedSession {
            uuid: payload.uuid,
            wisdom_points: payload.wisdom_points,
        })
    }

    async fn fetch_messages(&self, session: &SessionId) -> Result<Vec<Message>, ApiError> {
        let request = self
            .http
            .get(format!("{}/message", self.base_url))
            .query(&[("sessionId", session.as_str())]);
        decode_list(self.execute(request).await?, "history")
    }

    async fn fetch_targets(&self, session: &SessionId) -> Result<Vec<LearningTarget>, ApiError> {
        let request = self
            .http
            .get(format!("{}/session/{}/topic", self.base_url, session));
        decode_list(self.execute(request).await?, "targets")
    }

    async fn fetch_lessons(&self, session: &SessionId) -> Result<Vec<Lesson>, ApiError> {
        let request = self
            .http
            .get(format!("{}/session/{}/lessons", self.base_url, session));
        decode_list(self.execute(request).await?, "lessons")
    }

    async fn post_message(
        &self,
        session: &SessionId,
        text: &str,
    ) -> Result<Option<Message>, ApiError> {
        let request = self
            .http
            .post(format!("{}/message", self.base_url))
            .json(&SendRequest {
                text,
                session_id: session.as_str(),
            });

        let value = self.execute(request).await?;
        let envelope: SendEnvelope = match serde_json::from_value(value) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "send envelope in unexpected shape");
                SendEnvelope::default()
            }
        };
        Ok(envelope.message)
    }
}

/// Decode a bootstrap body that must be a JSON list.
///
/// A non-list body is an [`ApiError::UnexpectedShape`], which the resolver
/// settles to an empty collection rather than surfacing.
fn decode_list<T: DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<Vec<T>, ApiError> {
    match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
        }
        other => Err(ApiError::UnexpectedShape(format!(
            "{what} endpoint answered with {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}
