//! Realtime push-channel management.
//!
//! The transport itself (WebSocket) lives in `sagely-client`; this module
//! owns the connection lifecycle: the `Idle -> Connecting -> Open -> Closed`
//! state machine, the fixed-delay reconnect policy, and the decode-and-merge
//! path for inbound frames.

pub mod manager;
pub mod target;
pub mod transport;

pub use manager::{ChannelManager, ChannelState, RECONNECT_DELAY};
pub use target::ChannelTarget;
pub use transport::{ChannelConnection, ChannelTransport};
