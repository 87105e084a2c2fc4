//! dayplan scheduler
//!
//! Serves the task schedule over HTTP. The schedule is held in memory and
//! rebuilt from the full task list on every change.

use anyhow::Result;
use dayplan_allocation::AllocationEngine;
use dayplan_scheduler::{api, config, state::AppState, store::ScheduleStore};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to DAYPLAN_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting dayplan scheduler");

    let engine = AllocationEngine::new(config.allocation.clone());
    let strategy = engine.distributor_name();
    info!(
        listen_addr = %config.listen_addr,
        strategy,
        max_rebalance_moves = config.allocation.max_rebalance_moves,
        "Configuration loaded"
    );

    let state = AppState::new(ScheduleStore::new(engine), strategy);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal");
        })
        .await;

    match result {
        Ok(()) => info!("Scheduler shutdown complete"),
        Err(e) => {
            error!(error = %e, "Server error");
            return Err(e.into());
        }
    }
    Ok(())
}
