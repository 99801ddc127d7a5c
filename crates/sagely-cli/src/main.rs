//! Sagely terminal chat client.
//!
//! Binary name: `sagely`
//!
//! Wires the chat/session core to its infrastructure (REST backend,
//! WebSocket transport, file-backed session cache) and runs the
//! interactive chat loop.

mod commands;
mod input;
mod notify;
mod repl;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sagely_client::http::RestBackend;
use sagely_client::storage::FileSessionStore;
use sagely_client::ws::WsTransport;
use sagely_core::chat::ChatService;
use sagely_core::session::SessionStore;

use notify::ConsoleNotifier;

/// The fully wired service type this binary runs.
pub(crate) type Service = ChatService<RestBackend, FileSessionStore, WsTransport, ConsoleNotifier>;

#[derive(Parser)]
#[command(name = "sagely", version, about = "Learning-companion chat client")]
struct Cli {
    /// REST base URL (overrides config.toml)
    #[arg(long, env = "SAGELY_BASE_URL")]
    base_url: Option<String>,

    /// Push channel URL (overrides the derived ws:// URL)
    #[arg(long, env = "SAGELY_WS_URL")]
    ws_url: Option<String>,

    /// Store this bearer credential before starting
    #[arg(long, env = "SAGELY_TOKEN")]
    token: Option<String>,

    /// Data directory (session cache and config.toml)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Start a fresh session instead of resuming the cached one
    #[arg(long)]
    fresh: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,sagely=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(FileSessionStore::default_dir)
        .ok_or_else(|| anyhow::anyhow!("no data directory available; pass --data-dir"))?;

    let mut config = sagely_client::config::load_client_config(&data_dir).await;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(ws_url) = cli.ws_url {
        config.ws_url = Some(ws_url);
    }

    let store = FileSessionStore::new(&data_dir);
    if let Some(token) = &cli.token {
        store.store_token(token).await?;
    }
    if cli.fresh {
        store.clear_session().await?;
    }

    // The same cached credential authenticates REST calls and the channel
    // handshake.
    let token = match store.auth_token().await {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(error = %err, "could not read cached credential");
            None
        }
    };

    let backend = RestBackend::new(config.base_url.clone(), token);
    let service: Service = ChatService::new(
        config,
        backend,
        store,
        WsTransport::new(),
        ConsoleNotifier::new(),
    );

    repl::run(&service).await
}
