//! Chat service: the activation-scoped context object.
//!
//! One `ChatService` owns the whole live-chat lifecycle for one activation:
//! session resolution (single-flight), channel connection, bootstrap
//! hydration, and the send path. Consumers construct it with their
//! infrastructure implementations, call `init()` once on activation and
//! `close()` on teardown -- there is no ambient global instance.

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use sagely_types::config::ClientConfig;
use sagely_types::error::{ResolveError, SendError};
use sagely_types::learning::Lesson;
use sagely_types::message::Message;
use sagely_types::session::Session;

use crate::backend::BackendApi;
use crate::channel::{ChannelManager, ChannelState, ChannelTarget, ChannelTransport};
use crate::notify::{report_api_error, Notifier};
use crate::session::resolver;
use crate::session::store::SessionStore;
use crate::util::SingleFlight;

use super::state::SharedState;
use super::update::ChatUpdate;

/// Activation-scoped chat/session core.
///
/// Generic over the four ports so the logic is testable without any
/// network: the REST backend, the client-side session cache, the push
/// transport, and the notification surface.
pub struct ChatService<B, S, T, N>
where
    B: BackendApi + 'static,
    S: SessionStore + 'static,
    T: ChannelTransport,
    N: Notifier + 'static,
{
    config: ClientConfig,
    backend: Arc<B>,
    store: Arc<S>,
    notifier: Arc<N>,
    state: SharedState,
    channel: ChannelManager<T>,
    session: OnceLock<Session>,
    activation: SingleFlight<Result<Session, ResolveError>>,
    closed: CancellationToken,
}

impl<B, S, T, N> ChatService<B, S, T, N>
where
    B: BackendApi + 'static,
    S: SessionStore + 'static,
    T: ChannelTransport,
    N: Notifier + 'static,
{
    pub fn new(config: ClientConfig, backend: B, store: S, transport: T, notifier: N) -> Self {
        let state = SharedState::new();
        let channel = ChannelManager::new(transport, state.clone());
        Self {
            config,
            backend: Arc::new(backend),
            store: Arc::new(store),
            notifier: Arc::new(notifier),
            state,
            channel,
            session: OnceLock::new(),
            activation: SingleFlight::new(),
            closed: CancellationToken::new(),
        }
    }

    /// Activate the session: resolve, connect the channel, hydrate.
    ///
    /// Idempotent: once a session is resolved, later calls return it
    /// without touching the backend (the first resolution wins for the
    /// whole activation). Concurrent callers share one in-flight
    /// activation. On failure nothing is activated and calling `init()`
    /// again retries from scratch.
    pub async fn init(&self) -> Result<Session, ResolveError> {
        if let Some(session) = self.session.get() {
            return Ok(session.clone());
        }

        let config = self.config.clone();
        let backend = self.backend.clone();
        let store = self.store.clone();
        let notifier = self.notifier.clone();
        let state = self.state.clone();
        let channel = self.channel.clone();
        let closed = self.closed.clone();

        let result = self
            .activation
            .run(move || activate(config, backend, store, notifier, state, channel, closed))
            .await;

        result.map(|session| self.session.get_or_init(|| session).clone())
    }

    /// Submit user text to the backend.
    ///
    /// Sets the thinking indicator before the request. On success the
    /// returned message (if any) is appended and the indicator stays set
    /// until a `session busy = false` channel event -- or the consumer --
    /// clears it. On failure the error is surfaced and re-raised and the
    /// indicator is deliberately left set: clearing it is the caller's
    /// failure-handler's job.
    pub async fn send(&self, text: &str) -> Result<Option<Message>, SendError> {
        let session = self.session.get().ok_or(SendError::SessionUnresolved)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }

        self.state.set_thinking(true);

        match self.backend.post_message(&session.id, text).await {
            Ok(reply) => {
                if self.closed.is_cancelled() {
                    tracing::debug!("send completed after teardown, ignoring");
                    return Ok(reply);
                }
                if let Some(message) = &reply {
                    self.state.append_message(message.clone());
                }
                Ok(reply)
            }
            Err(err) => {
                report_api_error(self.notifier.as_ref(), "message send", &err);
                Err(err.into())
            }
        }
    }

    /// Tear the activation down: closes the channel (terminal) and makes
    /// any still-in-flight fetch or send settle without state mutation.
    pub fn close(&self) {
        self.closed.cancel();
        self.channel.close();
    }

    /// The resolved session, once `init()` has succeeded.
    pub fn session(&self) -> Option<Session> {
        self.session.get().cloned()
    }

    /// Shared conversation state (messages, targets, lessons, flags).
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Subscribe to state-change notifications.
    pub fn updates(&self) -> tokio::sync::broadcast::Receiver<ChatUpdate> {
        self.state.subscribe()
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    /// Consumer-level reset of the thinking indicator (used by failure
    /// handlers after a rejected send).
    pub fn set_thinking(&self, thinking: bool) {
        self.state.set_thinking(thinking);
    }

    /// Record a freshly completed lesson (newest first).
    pub fn record_lesson(&self, lesson: Lesson) {
        self.state.record_lesson(lesson);
    }

    /// Bump the reward counter.
    pub fn add_wisdom_points(&self, points: u32) {
        self.state.add_wisdom_points(points);
    }
}

impl<B, S, T, N> std::fmt::Debug for ChatService<B, S, T, N>
where
    B: BackendApi + 'static,
    S: SessionStore + 'static,
    T: ChannelTransport,
    N: Notifier + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("session", &self.session.get().map(|s| s.id.clone()))
            .field("channel", &self.channel.state())
            .finish()
    }
}

/// One activation attempt: resolve, open the channel, hydrate.
///
/// The channel is connected as soon as the session id is known -- before
/// the bootstrap fetches settle -- to minimize the missed-event window.
async fn activate<B, S, T, N>(
    config: ClientConfig,
    backend: Arc<B>,
    store: Arc<S>,
    notifier: Arc<N>,
    state: SharedState,
    channel: ChannelManager<T>,
    closed: CancellationToken,
) -> Result<Session, ResolveError>
where
    B: BackendApi,
    S: SessionStore,
    T: ChannelTransport,
    N: Notifier,
{
    let session = resolver::resolve(backend.clone(), store.clone(), notifier.clone()).await?;
    if closed.is_cancelled() {
        tracing::debug!("resolution completed after teardown");
        return Ok(session);
    }

    state.set_wisdom_points(session.wisdom_points);

    let token = match store.auth_token().await {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(error = %err, "could not read cached credential");
            None
        }
    };

    match ChannelTarget::build(&config, &session.id, token.as_ref()) {
        Ok(target) => channel.connect(target),
        Err(err) => {
            tracing::error!(error = %err, "cannot build channel target");
        }
    }

    tokio::select! {
        _ = closed.cancelled() => {
            tracing::debug!("teardown during bootstrap, discarding fetch results");
        }
        _ = resolver::bootstrap(backend, notifier, state, session.id.clone()) => {}
    }

    Ok(session)
}
