//! Chat/session core for the Sagely learning companion.
//!
//! This crate defines the "ports" (backend API, session store, channel
//! transport, notification surface) that the infrastructure layer
//! implements, plus the logic behind them: session resolution and
//! bootstrap, the realtime channel manager with its reconnect policy, the
//! event merger over shared state, and the send path. It depends only on
//! `sagely-types` -- never on an HTTP or WebSocket crate.

pub mod backend;
pub mod channel;
pub mod chat;
pub mod notify;
pub mod session;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;
