//! Hazard HMI server.
//!
//! Serves the alarm and spike lifecycle state for a simulated gas-hazard
//! facility. A presentation layer polls `/snapshot` and triggers demo
//! spikes through `/spike`.

use std::net::SocketAddr;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hazard_hmi::api::{
    AppState, delete_spike, get_facility, get_snapshot, get_spike, get_thresholds, health_check,
    post_classify, post_spike,
};
use hazard_hmi::config::AppConfig;
use hazard_hmi::facility::FacilityModel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("hazard_hmi=info".parse()?))
        .init();

    let config = AppConfig::from_env();
    info!(
        port = config.port,
        duration = config.timeline.duration,
        shutters_at = config.timeline.shutters_at,
        fade_after = config.timeline.fade_after,
        "Starting hazard HMI"
    );

    // Configuration errors are fatal here, never at request time
    let facility = FacilityModel::default();
    let policy = config.validate(&facility)?;
    info!(
        rooms = facility.rooms().len(),
        detectors = facility.detectors().count(),
        "Facility loaded"
    );

    let state = AppState::new(policy, facility, config.timeline);

    let app = Router::new()
        .route("/spike", post(post_spike).get(get_spike).delete(delete_spike))
        .route("/snapshot", get(get_snapshot))
        .route("/classify", post(post_classify))
        .route("/facility", get(get_facility))
        .route("/thresholds", get(get_thresholds))
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Hazard HMI is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
