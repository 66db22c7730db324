//! Setlist server binary.
//!
//! # Startup
//! ```text
//! CLI args → load + validate config → apply overrides, re-validate
//!     → init logging
//!     → session store, catalog, route table
//!     → bind listener → serve until Ctrl+C
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use setlist::catalog::{self, Argon2Hasher, CatalogRepository, InMemoryCatalog};
use setlist::config::{load_config, override_bind_address, AppConfig};
use setlist::observability::init_logging;
use setlist::{HttpServer, SessionStore, Shutdown};

#[derive(Parser)]
#[command(name = "setlist")]
#[command(about = "Song catalog web server", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Start with a few sample songs in the catalog.
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config = override_bind_address(config, bind)?;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "setlist starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        session_ttl_secs = config.session.ttl_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let sessions = Arc::new(SessionStore::from_config(&config.session));
    let repo: Arc<dyn CatalogRepository> = if cli.seed {
        Arc::new(InMemoryCatalog::seeded().await?)
    } else {
        Arc::new(InMemoryCatalog::new())
    };
    let routes = catalog::build_routes(repo, Arc::new(Argon2Hasher::default()))?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(shutdown.clone().on_ctrl_c());

    let server = HttpServer::new(config, routes, sessions)?;
    server.run(listener, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
