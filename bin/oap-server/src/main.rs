//! oap-server – entry point.
//!
//! Startup order:
//! 1. Parse the command line and configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Open the SQLite database and run pending migrations.
//! 4. Either run a `user` subcommand, or build the MCP tool set and serve
//!    HTTP with graceful shutdown.

mod auth;
mod cli;
mod config;
mod entities;
mod error;
mod mcp;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::auth::JwtKeys;
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::entities::SqliteStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = Config::from_env();

    // Warn loudly if the configured filter is not a valid tracing expression.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: OAP_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    // Logs go to stderr so `user` subcommands can print the token cleanly.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let store = SqliteStore::connect(&cfg.database_url).await?;
    info!(database_url = %cfg.database_url, "database ready");

    match cli.command.unwrap_or(Command::Serve) {
        Command::User { action } => {
            let keys = JwtKeys::new(&cfg.jwt_secret, cfg.token_ttl_secs);
            let token = cli::run_user(action, &store, &keys).await?;
            println!("{token}");
            Ok(())
        }
        Command::Serve => serve(cfg, store).await,
    }
}

async fn serve(cfg: Config, store: SqliteStore) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "oap-server starting");

    let addr: SocketAddr = cfg.bind_address.parse()?;
    let state = Arc::new(AppState::build(cfg, store)?);
    info!(
        tools = state.mcp.catalog().len(),
        backend = %state.config.oap_backend_url,
        "MCP tool catalog ready"
    );

    let app = routes::build(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("oap-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c   => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
