//! Channel lifecycle manager.
//!
//! Owns one push-channel connection scoped to the active session. Unexpected
//! closure (transport error or peer close) schedules exactly one reconnect
//! attempt after a fixed delay, indefinitely and without backoff growth.
//! Explicit [`ChannelManager::close`] is terminal: it cancels the live
//! connection and any pending reconnect timer, and no further automatic
//! reconnection ever happens. Stray events delivered after teardown are
//! no-ops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sagely_types::event::ChannelEvent;

use crate::chat::SharedState;

use super::target::ChannelTarget;
use super::transport::{ChannelConnection, ChannelTransport};

/// Fixed delay before a reconnect attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Lifecycle of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No channel requested yet.
    Idle,
    /// Handshake pending.
    Connecting,
    /// Handshake complete; events flow.
    Open,
    /// Dropped or explicitly closed.
    Closed,
}

/// Manages the single push-channel connection for one activation.
///
/// Cloning shares the manager. `connect` may be called once, after the
/// session is resolved; reconnects reuse the same target.
pub struct ChannelManager<T: ChannelTransport> {
    inner: Arc<ManagerInner<T>>,
}

struct ManagerInner<T: ChannelTransport> {
    transport: T,
    target: OnceLock<ChannelTarget>,
    state: Mutex<ChannelState>,
    /// At most one reconnect timer outstanding at a time.
    reconnect_pending: AtomicBool,
    shutdown: CancellationToken,
    chat: SharedState,
}

impl<T: ChannelTransport> ChannelManager<T> {
    pub fn new(transport: T, chat: SharedState) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                transport,
                target: OnceLock::new(),
                state: Mutex::new(ChannelState::Idle),
                reconnect_pending: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
                chat,
            }),
        }
    }

    pub fn state(&self) -> ChannelState {
        *self.inner.state.lock().expect("channel state lock")
    }

    /// Open the channel for the resolved session.
    ///
    /// A second call is ignored: the target is fixed for the lifetime of
    /// the manager and reconnection is automatic.
    pub fn connect(&self, target: ChannelTarget) {
        if self.inner.shutdown.is_cancelled() {
            tracing::warn!("connect requested after explicit close, ignoring");
            return;
        }
        if self.inner.target.set(target).is_err() {
            tracing::warn!("channel already connected, ignoring duplicate connect");
            return;
        }
        ManagerInner::spawn_connection(self.inner.clone());
    }

    /// Tear the channel down for good.
    ///
    /// Cancels the live connection and any pending reconnect timer. After
    /// this, closures and inbound frames are ignored.
    pub fn close(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        tracing::info!("closing channel");
        self.inner.shutdown.cancel();
        self.inner.set_state(ChannelState::Closed);
    }
}

impl<T: ChannelTransport> Clone for ChannelManager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ChannelTransport> std::fmt::Debug for ChannelManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelManager")
            .field("state", &*self.inner.state.lock().expect("channel state lock"))
            .finish()
    }
}

impl<T: ChannelTransport> ManagerInner<T> {
    fn set_state(&self, state: ChannelState) {
        *self.state.lock().expect("channel state lock") = state;
    }

    fn spawn_connection(inner: Arc<Self>) {
        tokio::spawn(Self::run_connection(inner));
    }

    async fn run_connection(inner: Arc<Self>) {
        if inner.shutdown.is_cancelled() {
            return;
        }
        let Some(target) = inner.target.get() else {
            return;
        };

        inner.set_state(ChannelState::Connecting);
        tracing::debug!(url = %target, "connecting channel");

        let connected = tokio::select! {
            _ = inner.shutdown.cancelled() => {
                inner.set_state(ChannelState::Closed);
                return;
            }
            result = inner.transport.connect(target) => result,
        };

        match connected {
            Ok(mut connection) => {
                inner.set_state(ChannelState::Open);
                tracing::info!(url = %target, "channel connected");

                loop {
                    tokio::select! {
                        _ = inner.shutdown.cancelled() => {
                            inner.set_state(ChannelState::Closed);
                            return;
                        }
                        frame = connection.next_frame() => match frame {
                            Some(Ok(text)) => inner.ingest(&text),
                            Some(Err(err)) => {
                                tracing::warn!(error = %err, "channel transport error");
                                break;
                            }
                            None => {
                                tracing::warn!("channel closed by peer");
                                break;
                            }
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "channel connect failed");
            }
        }

        inner.set_state(ChannelState::Closed);
        Self::schedule_reconnect(inner);
    }

    /// Schedule one reconnect attempt after [`RECONNECT_DELAY`].
    ///
    /// No-op when the manager was explicitly closed or a timer is already
    /// outstanding.
    fn schedule_reconnect(inner: Arc<Self>) {
        if inner.shutdown.is_cancelled() {
            return;
        }
        if inner.reconnect_pending.swap(true, Ordering::SeqCst) {
            tracing::debug!("reconnect already scheduled");
            return;
        }

        tracing::warn!(
            delay_secs = RECONNECT_DELAY.as_secs(),
            "channel down, scheduling reconnect"
        );
        tokio::spawn(async move {
            tokio::select! {
                _ = inner.shutdown.cancelled() => {}
                _ = tokio::time::sleep(RECONNECT_DELAY) => {
                    inner.reconnect_pending.store(false, Ordering::SeqCst);
                    Self::spawn_connection(inner.clone());
                }
            }
        });
    }

    /// Decode one inbound frame and merge it into the shared state.
    ///
    /// Malformed frames are logged and dropped; frames racing an explicit
    /// close are ignored.
    fn ingest(&self, text: &str) {
        if self.shutdown.is_cancelled() {
            return;
        }
        match serde_json::from_str::<ChannelEvent>(text) {
            Ok(event) => {
                tracing::debug!(event = ?event, "channel event");
                self.chat.apply_event(&event);
            }
            Err(err) => {
                tracing::warn!(error = %err, raw = text, "ignoring malformed channel frame");
            }
        }
    }
}
