use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tally_ledger::{
    AccountStore, Ledger, LedgerStore, MemoryLedgerStore, SqliteLedgerStore,
};
use tally_server::{build_router, seed, AppState, ServerConfig, StoreBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tally-server", about = "Tally general-ledger API server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the listen address from the config.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    let store: Arc<dyn LedgerStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryLedgerStore::new()),
        StoreBackend::Sqlite => Arc::new(
            SqliteLedgerStore::new(&config.store.sqlite_path)
                .with_context(|| format!("open {}", config.store.sqlite_path.display()))?,
        ),
    };
    if config.store.seed_demo && store.accounts()?.is_empty() {
        info!("seeding demo ledger data");
        seed::apply(store.as_ref())?;
    }

    let ledger = Arc::new(Ledger::open(store)?);
    let state = AppState {
        ledger,
        pagination: config.pagination,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("bind {}", config.listen))?;
    info!(listen = %config.listen, "tally-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    // Ctrl-C is the only shutdown trigger; the stores have no state to flush.
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
