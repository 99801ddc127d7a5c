//! WsTransport -- concrete [`ChannelTransport`] over tokio-tungstenite.
//!
//! The manager in `sagely-core` only consumes text frames; close frames end
//! the stream, and ping/pong/binary frames are skipped here (tungstenite
//! answers pings itself).

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use sagely_core::channel::{ChannelConnection, ChannelTarget, ChannelTransport};
use sagely_types::error::ChannelError;

/// WebSocket transport for the push channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        Self
    }
}

impl ChannelTransport for WsTransport {
    type Connection = WsConnection;

    async fn connect(&self, target: &ChannelTarget) -> Result<WsConnection, ChannelError> {
        let (stream, response) = connect_async(target.url())
            .await
            .map_err(|err| ChannelError::Connect(err.to_string()))?;
        tracing::debug!(status = %response.status(), "websocket handshake complete");
        Ok(WsConnection { stream })
    }
}

/// One live WebSocket connection.
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl ChannelConnection for WsConnection {
    async fn next_frame(&mut self) -> Option<Result<String, ChannelError>> {
        loop {
            match self.stream.next().await? {
                Ok(WsMessage::Text(text)) => return Some(Ok(text.to_string())),
                Ok(WsMessage::Close(_)) => return None,
                // Ping/pong/binary/raw frames carry no events.
                Ok(_) => continue,
                Err(err) => return Some(Err(ChannelError::Transport(err.to_string()))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::SinkExt;
    use sagely_types::config::ClientConfig;
    use sagely_types::session::SessionId;
    use tokio_tungstenite::tungstenite::Bytes;

    async fn target_for(addr: std::net::SocketAddr) -> ChannelTarget {
        let config = ClientConfig {
            base_url: "http://unused.invalid/api/v1".to_string(),
            ws_url: Some(format!("ws://{addr}/ws")),
        };
        ChannelTarget::build(&config, &SessionId::new("s-test"), None).unwrap()
    }

    #[tokio::test]
    async fn delivers_text_frames_and_ends_on_close() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(WsMessage::Text("one".into())).await.unwrap();
            ws.send(WsMessage::Ping(Bytes::new())).await.unwrap();
            ws.send(WsMessage::Text("two".into())).await.unwrap();
            ws.close(None).await.unwrap();
        });

        let target = target_for(addr).await;
        let mut connection = WsTransport::new().connect(&target).await.unwrap();

        assert_eq!(connection.next_frame().await.unwrap().unwrap(), "one");
        // The ping is skipped, not surfaced.
        assert_eq!(connection.next_frame().await.unwrap().unwrap(), "two");
        assert!(connection.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = target_for(addr).await;
        let result = WsTransport::new().connect(&target).await;
        assert!(matches!(result, Err(ChannelError::Connect(_))));
    }
}
