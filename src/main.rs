//! devserve: serve a directory over HTTP and reload open pages when it changes.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET /some/page.html
//!     ──────────────────▶ http::server ──▶ routing::resolver ──▶ http::static_files
//!                                                                     │
//!                                                  HTML? ──▶ transform (inject snippet)
//!                                                                     │
//!     ◀────────────────────────── chunked body ◀──────────────────────┘
//!
//!     file saved under root
//!     ──────────────────▶ reload::notifier ──▶ reload::registry ──▶ http::websocket
//!                                                                     │
//!     ◀──────────────────────────── "reload" frame ◀──────────────────┘
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;

use devserve::config::{load_config, ServerConfig};
use devserve::lifecycle::{signals, startup};
use devserve::observability::{logging, metrics};
use devserve::reload::ReloadTrigger;
use devserve::{HttpServer, Shutdown};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "devserve.toml";

#[derive(Parser, Debug)]
#[command(name = "devserve", version, about = "Static file server with live reload")]
struct Cli {
    /// Directory to serve.
    root: Option<PathBuf>,

    /// Port to listen on (0 picks a free port).
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long)]
    host: Option<String>,

    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve files without the reload snippet or websocket.
    #[arg(long)]
    no_live_reload: bool,

    /// Which filesystem events trigger a reload.
    #[arg(long, value_enum)]
    reload_on: Option<ReloadTrigger>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Parse the config file without validating it; overrides come first.
    fn load(&self) -> Result<ServerConfig, devserve::config::ConfigError> {
        match &self.config {
            Some(path) => load_config(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                load_config(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(ServerConfig::default()),
        }
    }

    fn apply(self, config: &mut ServerConfig) {
        if let Some(root) = self.root {
            config.serve.root = root;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if self.no_live_reload {
            config.live_reload.enabled = false;
        }
        if let Some(trigger) = self.reload_on {
            config.live_reload.trigger = trigger;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = cli.load()?;
    cli.apply(&mut config);

    logging::init(&config.observability.log_level);
    tracing::info!("devserve v{} starting", env!("CARGO_PKG_VERSION"));

    let config = startup::prepare(config)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = startup::bind(&config.listener).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        url = %format!("http://{local_addr}/"),
        root = %config.serve.root.display(),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown.clone());

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
