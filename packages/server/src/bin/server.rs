// Main entry point for the matching engine host

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server_core::domains::expiry::ExpirySweeper;
use server_core::domains::gamification::GamificationLedger;
use server_core::domains::listings::models::ListingPin;
use server_core::domains::notifications::TracingSink;
use server_core::kernel::directory::{InMemoryFacilityDirectory, InMemoryReceiverDirectory};
use server_core::kernel::geo_index::GeoIndex;
use server_core::kernel::scheduled_tasks::start_scheduler;
use server_core::kernel::{EventBus, InMemoryListingStore, ServerDeps};
use server_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FoodLoop matching engine");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(?config, "Configuration loaded");

    let receivers = Arc::new(InMemoryReceiverDirectory::new());
    let facilities = Arc::new(InMemoryFacilityDirectory::new());
    let listing_index: Arc<GeoIndex<ListingPin>> = Arc::new(GeoIndex::new());

    // Build the spatial indexes up front; queries degrade to bounded
    // scans if a host skips this.
    receivers.build_index().await;
    facilities.build_index().await;
    listing_index.rebuild().await;

    let deps = ServerDeps {
        config: config.clone(),
        listings: Arc::new(InMemoryListingStore::new()),
        listing_index,
        receivers,
        facilities,
        ledger: Arc::new(GamificationLedger::new()),
        notifier: Arc::new(TracingSink),
        bus: EventBus::new(),
    };

    let sweeper = Arc::new(ExpirySweeper::new(deps));
    let mut scheduler = start_scheduler(sweeper.clone(), config.sweep_interval)
        .await
        .context("Failed to start scheduler")?;

    tracing::info!("Engine running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    // Stop scheduling new sweeps, then let any in-flight sweep finish so
    // no listing is left mid-transition.
    tracing::info!("Shutting down");
    scheduler.shutdown().await.ok();
    sweeper.wait_idle().await;
    tracing::info!("Shutdown complete");

    Ok(())
}
