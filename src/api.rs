//! HTTP API handlers exposing the board's entity surface.
//!
//! The entity layer pulls from the coordinator's cache on every read; the
//! handlers never trigger network fetches except for the explicit
//! `POST /refresh`, which runs one full cycle (or is dropped if one is
//! already in flight).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument, warn};

use crate::coordinator::Coordinator;
use crate::entity::{EntityKind, EntityState};
use crate::model::TickerView;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

/// GET /entities - read all five entity states.
///
/// Returns `503 Service Unavailable` until the first refresh cycle has
/// completed.
#[instrument(skip(state))]
pub async fn get_entities(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntityState>>, StatusCode> {
    let entities: Option<Vec<EntityState>> = EntityKind::ALL
        .iter()
        .map(|kind| state.coordinator.entity_state(*kind))
        .collect();

    match entities {
        Some(entities) => {
            info!(count = entities.len(), "entities read");
            Ok(Json(entities))
        }
        None => {
            warn!("board not refreshed yet");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// GET /entities/:id - read one entity state by its stable id.
#[instrument(skip(state))]
pub async fn get_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EntityState>, StatusCode> {
    let kind = match EntityKind::from_id(&id) {
        Some(kind) => kind,
        None => {
            warn!(entity = %id, "unknown entity");
            return Err(StatusCode::NOT_FOUND);
        }
    };

    match state.coordinator.entity_state(kind) {
        Some(entity) => Ok(Json(entity)),
        None => {
            warn!(entity = %id, "board not refreshed yet");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// GET /ticker - the display-ready ticker view.
#[instrument(skip(state))]
pub async fn get_ticker(State(state): State<AppState>) -> Result<Json<TickerView>, StatusCode> {
    match state.coordinator.ticker_view() {
        Some(view) => Ok(Json(view)),
        None => {
            warn!("board not refreshed yet");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// POST /refresh - run one refresh cycle now.
///
/// Returns `202 Accepted` once the cycle has completed. A request arriving
/// while a cycle is already in flight is dropped by the coordinator and
/// also answered with 202.
#[instrument(skip(state))]
pub async fn post_refresh(State(state): State<AppState>) -> impl IntoResponse {
    state.coordinator.refresh().await;
    info!("forced refresh handled");
    StatusCode::ACCEPTED
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
