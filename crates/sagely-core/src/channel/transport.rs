//! Channel transport port.
//!
//! Implementations live in `sagely-client` (`WsTransport`). The manager
//! only ever sees text frames; protocol frames (ping/pong/binary) are the
//! transport's business.

use sagely_types::error::ChannelError;

use super::target::ChannelTarget;

/// Factory for push-channel connections.
pub trait ChannelTransport: Send + Sync + 'static {
    type Connection: ChannelConnection;

    /// Open a connection and complete the handshake.
    fn connect(
        &self,
        target: &ChannelTarget,
    ) -> impl std::future::Future<Output = Result<Self::Connection, ChannelError>> + Send;
}

/// One live push-channel connection.
pub trait ChannelConnection: Send + 'static {
    /// Next inbound text frame.
    ///
    /// `Some(Ok(text))` is a frame, `Some(Err(_))` a transport error, and
    /// `None` means the peer closed the connection. Errors and closure are
    /// both treated as unexpected closure by the manager.
    fn next_frame(
        &mut self,
    ) -> impl std::future::Future<Output = Option<Result<String, ChannelError>>> + Send;
}
