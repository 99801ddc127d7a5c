//! BackendApi trait definition.
//!
//! The REST port for the learning backend. Implementations live in
//! `sagely-client` (e.g. `RestBackend`). Uses native async fn in traits
//! (RPITIT, Rust 2024 edition).

use sagely_types::error::ApiError;
use sagely_types::learning::{Lesson, LearningTarget};
use sagely_types::message::Message;
use sagely_types::session::SessionId;

/// The backend's answer to a session resolution request.
///
/// `uuid` is optional on purpose: a backend that answers without one has
/// not established a session, and the resolver turns that into a hard
/// failure rather than trusting the rest of the payload.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSession {
    pub uuid: Option<String>,
    pub wisdom_points: Option<u32>,
}

/// REST operations the chat/session core performs against the backend.
pub trait BackendApi: Send + Sync {
    /// Establish or resume a session. A cached identifier, when supplied,
    /// asks the backend to resume that session.
    fn resolve_session(
        &self,
        cached: Option<&SessionId>,
    ) -> impl std::future::Future<Output = Result<ResolvedSession, ApiError>> + Send;

    /// Message history for a session, oldest first.
    fn fetch_messages(
        &self,
        session: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, ApiError>> + Send;

    /// Learning targets tracked for a session.
    fn fetch_targets(
        &self,
        session: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<LearningTarget>, ApiError>> + Send;

    /// Recently recorded lessons for a session.
    fn fetch_lessons(
        &self,
        session: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<Lesson>, ApiError>> + Send;

    /// Submit user text. The backend may answer with the persisted message
    /// immediately, or deliver the reply later over the push channel.
    fn post_message(
        &self,
        session: &SessionId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Option<Message>, ApiError>> + Send;
}
