use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use tokio::sync::Mutex;

use offlinist::config::Config;
use offlinist::constants::DATABASE_FILE;
use offlinist::gateway::HttpGateway;
use offlinist::network::{NetworkMonitor, NetworkStatus};
use offlinist::storage::LocalStorage;
use offlinist::sync::SyncService;
use offlinist::{logger, scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    logger::init(&config)?;

    let database_path = match &config.storage.database_path {
        Some(path) => path.clone(),
        None => Config::get_data_dir()?.join(DATABASE_FILE),
    };
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    info!("💾 Database: {}", database_path.display());
    let storage = Arc::new(Mutex::new(LocalStorage::open(&database_path).await?));

    let gateway = Arc::new(HttpGateway::new(
        &config.remote.base_url,
        Duration::from_secs(config.remote.timeout_seconds),
    )?);

    // No reachability probe here: the daemon assumes connectivity at startup
    // and the monitor handle is where a real probe would report changes.
    let monitor = NetworkMonitor::new(NetworkStatus::online());
    let service = SyncService::new(storage, gateway, monitor.subscribe());

    // One immediate pass picks up anything left queued by a previous run
    let report = service.sync().await?;
    info!("Initial sync: {} synced, {} errors", report.synced, report.errors);

    tokio::select! {
        _ = scheduler::run_auto_sync(
            service.clone(),
            monitor.subscribe(),
            config.sync.auto_sync_interval_seconds,
            config.sync.auto_sync_enabled,
        ) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C - shutting down");
        }
    }

    Ok(())
}
