//! In-crate test doubles for the port traits.
//!
//! Shared by the resolver, channel, and service tests so every suite
//! scripts backends, stores, transports, and notifiers the same way.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;

use sagely_types::error::{ApiError, ChannelError, StoreError};
use sagely_types::learning::{Lesson, LearningTarget};
use sagely_types::message::Message;
use sagely_types::session::SessionId;

use crate::backend::{BackendApi, ResolvedSession};
use crate::channel::target::ChannelTarget;
use crate::channel::transport::{ChannelConnection, ChannelTransport};
use crate::notify::{NoticeLevel, Notifier};
use crate::session::store::SessionStore;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Scriptable [`BackendApi`] double.
///
/// Queue resolutions and post responses; set bootstrap results; inspect
/// everything afterwards.
#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    inner: Arc<MockBackendInner>,
}

#[derive(Default)]
struct MockBackendInner {
    resolutions: Mutex<VecDeque<Result<ResolvedSession, ApiError>>>,
    resolution_args: Mutex<Vec<Option<String>>>,
    resolve_calls: AtomicUsize,
    resolve_delay: Mutex<Duration>,
    messages: Mutex<Option<Result<Vec<Message>, ApiError>>>,
    targets: Mutex<Option<Result<Vec<LearningTarget>, ApiError>>>,
    lessons: Mutex<Option<Result<Vec<Lesson>, ApiError>>>,
    posts: Mutex<VecDeque<Result<Option<Message>, ApiError>>>,
    post_delay: Mutex<Duration>,
    posted: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    pub fn queue_resolution(&self, resolved: ResolvedSession) {
        self.inner.resolutions.lock().unwrap().push_back(Ok(resolved));
    }

    pub fn queue_resolution_error(&self, err: ApiError) {
        self.inner.resolutions.lock().unwrap().push_back(Err(err));
    }

    pub fn set_resolve_delay(&self, delay: Duration) {
        *self.inner.resolve_delay.lock().unwrap() = delay;
    }

    pub fn set_messages(&self, result: Result<Vec<Message>, ApiError>) {
        *self.inner.messages.lock().unwrap() = Some(result);
    }

    pub fn set_targets(&self, result: Result<Vec<LearningTarget>, ApiError>) {
        *self.inner.targets.lock().unwrap() = Some(result);
    }

    pub fn set_lessons(&self, result: Result<Vec<Lesson>, ApiError>) {
        *self.inner.lessons.lock().unwrap() = Some(result);
    }

    pub fn queue_post(&self, result: Result<Option<Message>, ApiError>) {
        self.inner.posts.lock().unwrap().push_back(result);
    }

    pub fn set_post_delay(&self, delay: Duration) {
        *self.inner.post_delay.lock().unwrap() = delay;
    }

    pub fn resolve_calls(&self) -> usize {
        self.inner.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn resolution_args(&self) -> Vec<Option<String>> {
        self.inner.resolution_args.lock().unwrap().clone()
    }

    /// `(session_id, text)` pairs seen by `post_message`.
    pub fn posted(&self) -> Vec<(String, String)> {
        self.inner.posted.lock().unwrap().clone()
    }
}

impl BackendApi for MockBackend {
    async fn resolve_session(
        &self,
        cached: Option<&SessionId>,
    ) -> Result<ResolvedSession, ApiError> {
        self.inner.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .resolution_args
            .lock()
            .unwrap()
            .push(cached.map(|id| id.as_str().to_string()));

        let delay = *self.inner.resolve_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.inner
            .resolutions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ResolvedSession {
                    uuid: Some("s-default".to_string()),
                    wisdom_points: None,
                })
            })
    }

    async fn fetch_messages(&self, _session: &SessionId) -> Result<Vec<Message>, ApiError> {
        self.inner
            .messages
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn fetch_targets(&self, _session: &SessionId) -> Result<Vec<LearningTarget>, ApiError> {
        self.inner
            .targets
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn fetch_lessons(&self, _session: &SessionId) -> Result<Vec<Lesson>, ApiError> {
        self.inner
            .lessons
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn post_message(
        &self,
        session: &SessionId,
        text: &str,
    ) -> Result<Option<Message>, ApiError> {
        self.inner
            .posted
            .lock()
            .unwrap()
            .push((session.as_str().to_string(), text.to_string()));

        let delay = *self.inner.post_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.inner
            .posts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// In-memory [`SessionStore`] double.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    session: Mutex<Option<SessionId>>,
    token: Mutex<Option<String>>,
    fail_loads: AtomicBool,
}

impl MemoryStore {
    pub fn set_session(&self, id: SessionId) {
        *self.inner.session.lock().unwrap() = Some(id);
    }

    pub fn set_token(&self, token: &str) {
        *self.inner.token.lock().unwrap() = Some(token.to_string());
    }

    pub fn fail_loads(&self) {
        self.inner.fail_loads.store(true, Ordering::SeqCst);
    }

    pub fn saved_session(&self) -> Option<SessionId> {
        self.inner.session.lock().unwrap().clone()
    }
}

impl SessionStore for MemoryStore {
    async fn load_session(&self) -> Result<Option<SessionId>, StoreError> {
        if self.inner.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Io("scripted failure".to_string()));
        }
        Ok(self.inner.session.lock().unwrap().clone())
    }

    async fn save_session(&self, id: &SessionId) -> Result<(), StoreError> {
        *self.inner.session.lock().unwrap() = Some(id.clone());
        Ok(())
    }

    async fn auth_token(&self) -> Result<Option<SecretString>, StoreError> {
        if self.inner.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Io("scripted failure".to_string()));
        }
        Ok(self
            .inner
            .token
            .lock()
            .unwrap()
            .clone()
            .map(SecretString::from))
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// [`Notifier`] double that records every notice.
#[derive(Clone, Default)]
pub(crate) struct CapturingNotifier {
    notices: Arc<Mutex<Vec<(NoticeLevel, String)>>>,
}

impl CapturingNotifier {
    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Notifier for CapturingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Channel transport
// ---------------------------------------------------------------------------

enum EndBehavior {
    Pend,
    Close,
}

/// Scriptable [`ChannelConnection`]: replays frames, then pends or closes.
pub(crate) struct ScriptedConnection {
    initial_delay: Option<Duration>,
    frames: VecDeque<String>,
    on_end: EndBehavior,
}

impl ScriptedConnection {
    pub fn pend_forever() -> Self {
        Self {
            initial_delay: None,
            frames: VecDeque::new(),
            on_end: EndBehavior::Pend,
        }
    }

    pub fn close_now() -> Self {
        Self {
            initial_delay: None,
            frames: VecDeque::new(),
            on_end: EndBehavior::Close,
        }
    }

    pub fn frames_then_pend(frames: Vec<String>) -> Self {
        Self {
            initial_delay: None,
            frames: frames.into(),
            on_end: EndBehavior::Pend,
        }
    }

    pub fn frames_then_close(frames: Vec<String>) -> Self {
        Self {
            initial_delay: None,
            frames: frames.into(),
            on_end: EndBehavior::Close,
        }
    }

    /// Wait `delay` before delivering the first frame, then stay open.
    pub fn delay_then_frames(delay: Duration, frames: Vec<String>) -> Self {
        Self {
            initial_delay: Some(delay),
            frames: frames.into(),
            on_end: EndBehavior::Pend,
        }
    }
}

impl ChannelConnection for ScriptedConnection {
    async fn next_frame(&mut self) -> Option<Result<String, ChannelError>> {
        if let Some(delay) = self.initial_delay.take() {
            tokio::time::sleep(delay).await;
        }
        match self.frames.pop_front() {
            Some(frame) => Some(Ok(frame)),
            None => match self.on_end {
                EndBehavior::Pend => futures_util::future::pending().await,
                EndBehavior::Close => None,
            },
        }
    }
}

type ConnectionFactory =
    Arc<dyn Fn() -> Result<ScriptedConnection, ChannelError> + Send + Sync + 'static>;

/// Scriptable [`ChannelTransport`] counting connect attempts.
#[derive(Clone)]
pub(crate) struct ScriptedTransport {
    attempts: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
    factory: ConnectionFactory,
}

impl ScriptedTransport {
    fn new(factory: ConnectionFactory) -> Self {
        Self {
            attempts: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
            factory,
        }
    }

    /// Every connect fails.
    pub fn always_fail() -> Self {
        Self::new(Arc::new(|| {
            Err(ChannelError::Connect("scripted refusal".to_string()))
        }))
    }

    /// Every connect succeeds and the connection stays silent forever.
    pub fn stay_open() -> Self {
        Self::new(Arc::new(|| Ok(ScriptedConnection::pend_forever())))
    }

    /// Every connect succeeds and the peer closes straight away.
    pub fn close_immediately() -> Self {
        Self::new(Arc::new(|| Ok(ScriptedConnection::close_now())))
    }

    /// First connection replays `frames` then stays open.
    pub fn with_frames(frames: Vec<String>) -> Self {
        let frames = Mutex::new(Some(frames));
        Self::new(Arc::new(move || {
            let frames = frames.lock().unwrap().take().unwrap_or_default();
            Ok(ScriptedConnection::frames_then_pend(frames))
        }))
    }

    /// Custom per-connection behavior.
    pub fn with_behavior<F>(behavior: F) -> Self
    where
        F: Fn() -> ScriptedConnection + Send + Sync + 'static,
    {
        Self::new(Arc::new(move || Ok(behavior())))
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn connected_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl ChannelTransport for ScriptedTransport {
    type Connection = ScriptedConnection;

    async fn connect(&self, target: &ChannelTarget) -> Result<ScriptedConnection, ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(target.url().to_string());
        (self.factory)()
    }
}
