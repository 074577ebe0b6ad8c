//! GeoBlocker - Country blocklist service with upstream IP geolocation
//!
//! This is the composition root that wires together all the components.

use geo_blocker::adapters::inbound::{ApiServer, ApiState};
use geo_blocker::adapters::outbound::{DashMapBlockedStore, IpApiGeoService};
use geo_blocker::application::GeoBlockService;
use geo_blocker::config::load_config;
use geo_blocker::infrastructure::{shutdown_signal, ShutdownController, TemporalBlockSweeper};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting GeoBlocker listen={} upstream={}",
        cfg.listen_addr,
        cfg.ip_api_base_url
    );

    // ===== COMPOSITION ROOT =====
    // Wire up all adapters and services

    // 1. Create outbound adapters
    let store = Arc::new(DashMapBlockedStore::new());
    let geo = Arc::new(IpApiGeoService::new(
        cfg.ip_api_base_url.clone(),
        cfg.ip_api_key.clone(),
    ));

    // 2. Create application service
    let service = Arc::new(GeoBlockService::new(store.clone(), geo));

    // 3. Shutdown coordination
    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // 4. Background expiry sweeper
    let sweeper = TemporalBlockSweeper::new(
        store.clone(),
        Duration::from_secs(cfg.cleanup_interval_secs),
    );
    sweeper.spawn(&shutdown);

    // 5. Create inbound adapter and run
    let server = ApiServer::new(cfg.listen_addr, ApiState { store, service });
    server.run(shutdown).await
}
