//! Registry server binary.
//!
//! Wires the fetch pipeline to the query surface:
//!
//! ```text
//! scheduler ── rounds ──▶ importer ──▶ DuckDB ◀── resolver ◀── GET /symbols
//! ```
//!
//! Shutdown on Ctrl-C: the HTTP server drains, the scheduler is signalled
//! between rounds, and the importer runs until the round channel closes.

mod cli;
mod http;
mod importer;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

use symreg_core::http_client::HttpClient;
use symreg_core::store::SnapshotStore;
use symreg_core::{
    fetcher_for, FetchDispatcher, FetchScheduler, ReqwestHttpClient, RetryPolicy,
    SnapshotResolver,
};
use symreg_store::SnapshotDb;

use crate::cli::ServerArgs;
use crate::importer::SnapshotImporter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = ServerArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let exchanges = args.fetch_exchanges()?;
    info!(
        exchanges = ?exchanges.iter().map(|e| e.as_str()).collect::<Vec<_>>(),
        interval_secs = args.fetch_interval_secs,
        "starting symbol registry"
    );

    let db = SnapshotDb::open(&args.db_path)?;
    info!(db_path = %db.db_path().display(), "snapshot database ready");
    let store: Arc<dyn SnapshotStore> = Arc::new(db);

    let transport: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let fetchers = exchanges
        .iter()
        .map(|&exchange| fetcher_for(exchange, Arc::clone(&transport)))
        .collect::<Vec<_>>();
    let dispatcher = Arc::new(FetchDispatcher::new(fetchers, args.dispatch_config()));

    let (round_tx, round_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = FetchScheduler::new(dispatcher, exchanges, args.fetch_interval());
    let scheduler_task = tokio::spawn(scheduler.run(round_tx, shutdown_rx));

    let retry = RetryPolicy {
        max_retries: args.import_retries,
        ..RetryPolicy::default()
    };
    let importer = SnapshotImporter::new(Arc::clone(&store), retry);
    let importer_task = tokio::spawn(importer.run(round_rx));

    let resolver = Arc::new(SnapshotResolver::new(store));
    let app = http::router(http::AppState { resolver });

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!(listen = %args.listen, "http interface listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The scheduler drops its sender on exit, which ends the importer.
    let _ = shutdown_tx.send(true);
    scheduler_task.await?;
    importer_task.await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
