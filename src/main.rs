//! Pulseboard - a realtime information board over four upstream feeds.
//!
//! # Overview
//!
//! The server polls trending headlines, regional fuel price, the USD→CNY
//! exchange rate, and city air quality on a twice-daily schedule (or a fixed
//! interval in the legacy mode), rotates a headline ticker between
//! refreshes, and serves the aggregate over HTTP.
//!
//! # Configuration
//!
//! - `PULSEBOARD_API_KEY`: upstream API key (required)
//! - `PULSEBOARD_FUEL_PROVINCE`: province name as the upstream expects it
//!   (e.g. `福建`; default `福建`)
//! - `PULSEBOARD_AIR_CITY`: city for air quality (default `莆田`)
//! - `PULSEBOARD_ROTATION_SECS`: ticker rotation interval (default 15)
//! - `PULSEBOARD_REFRESH_MINUTES`: opts into the legacy fixed-interval
//!   refresh schedule instead of the 07:00/16:00 wall-clock one
//! - `PULSEBOARD_PORT`: HTTP port (default 3000)
//!
//! # API Endpoints
//!
//! - `GET /entities` - all five entity states
//! - `GET /entities/:id` - one entity state
//! - `GET /ticker` - the display-ready ticker view
//! - `POST /refresh` - force one refresh cycle
//! - `GET /health` - health check

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pulseboard::api::{AppState, get_entities, get_entity, get_ticker, health_check, post_refresh};
use pulseboard::config::{CoordinatorConfig, Province, RefreshSchedule};
use pulseboard::coordinator::Coordinator;

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("pulseboard=info".parse()?))
        .init();

    let config = config_from_env()?;

    let port: u16 = env::var("PULSEBOARD_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    info!(
        province = %config.fuel_province,
        city = %config.air_city,
        rotation_secs = config.rotation_secs,
        "Starting Pulseboard"
    );

    let coordinator = Arc::new(Coordinator::new(config)?);

    // The board is ready only once the first full cycle has completed.
    coordinator.first_refresh().await;
    info!("First refresh complete");

    // Handles must stay alive for the triggers to keep firing.
    let _triggers = coordinator.start();

    let state = AppState { coordinator };

    let app = Router::new()
        .route("/entities", get(get_entities))
        .route("/entities/:id", get(get_entity))
        .route("/ticker", get(get_ticker))
        .route("/refresh", post(post_refresh))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Pulseboard is listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load the coordinator configuration from environment variables.
fn config_from_env() -> anyhow::Result<CoordinatorConfig> {
    let api_key = env::var("PULSEBOARD_API_KEY")
        .map_err(|_| anyhow::anyhow!("PULSEBOARD_API_KEY must be set"))?;

    let mut config = CoordinatorConfig::new(api_key);

    if let Ok(name) = env::var("PULSEBOARD_FUEL_PROVINCE") {
        config.fuel_province = name.parse::<Province>()?;
    }
    if let Ok(city) = env::var("PULSEBOARD_AIR_CITY") {
        config.air_city = city;
    }
    if let Ok(secs) = env::var("PULSEBOARD_ROTATION_SECS") {
        config.rotation_secs = secs.parse()?;
    }
    // Setting a minute interval opts into the legacy fixed-interval schedule.
    if let Ok(minutes) = env::var("PULSEBOARD_REFRESH_MINUTES") {
        config.schedule = RefreshSchedule::Interval {
            minutes: minutes.parse()?,
        };
    }

    Ok(config)
}
