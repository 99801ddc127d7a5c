//! Infrastructure layer for the Sagely chat/session core.
//!
//! Implements the ports defined in `sagely-core`: [`http::RestBackend`]
//! (reqwest) for the REST API, [`ws::WsTransport`] (tokio-tungstenite) for
//! the push channel, and [`storage::FileSessionStore`] for the client-side
//! durable cache. [`config`] loads `config.toml` from the data directory.

pub mod config;
pub mod http;
pub mod storage;
pub mod ws;
