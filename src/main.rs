use anyhow::Result;
use log::info;
use secure_sight::api::RestApi;
use secure_sight::config;
use secure_sight::dashboard::resolve::{IncidentStore, ResolutionCoordinator};
use secure_sight::db::repositories::SqlIncidentStore;
use secure_sight::db::DatabaseService;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

async fn run_app() -> Result<()> {
    // Initialize logging
    env_logger::init();
    info!("Starting SecureSight dashboard backend");

    // Optional config file path as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;
    info!("Configuration loaded");

    // Connect and run the one-time startup routine (migrations + seed)
    let database = DatabaseService::new(&config.database).await?;
    database.initialize().await?;

    let store = SqlIncidentStore::new(
        Arc::clone(&database.pool),
        config.dashboard.incident_limit,
    );

    // Operator session starts from a fresh listing with the first unresolved
    // incident selected
    let incidents = store.list_incidents(None).await?;
    let session = Arc::new(Mutex::new(ResolutionCoordinator::new(incidents)));
    info!("Dashboard session initialized");

    let http_server = RestApi::new(
        &config.api,
        Arc::clone(&database.pool),
        store,
        session,
        config.dashboard.incident_limit,
    )?;

    tokio::select! {
        result = http_server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}

fn main() {
    // Single-threaded cooperative scheduling: all persistence calls suspend
    // the calling task, nothing runs in parallel threads
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime");

    if let Err(e) = runtime.block_on(run_app()) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
