//! HTTP API handlers for the hazard HMI.
//!
//! The presentation layer polls these endpoints; every response is computed
//! from the active spike and the clock at request time.
//!
//! - **POST /spike**: start a simulated spike (replaces any active one).
//! - **GET /spike**: the active spike with its current phase and messages.
//! - **DELETE /spike**: operator reset.
//! - **GET /snapshot**: per-detector tick snapshot.
//! - **POST /classify**: classify a single reading.
//! - **GET /facility**, **GET /thresholds**: static configuration.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::error::HazardError;
use crate::facility::FacilityModel;
use crate::model::{
    ClassifyRequest, ClassifyResponse, SnapshotQuery, SpikeRequest, SpikeStatusResponse,
};
use crate::notify::due_messages;
use crate::policy::ThresholdPolicy;
use crate::session::SpikeRegister;
use crate::simulator::Simulator;
use crate::snapshot::{FacilitySnapshot, compute_snapshot};
use crate::spike::{SpikeEvent, SpikeTimeline};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<ThresholdPolicy>,
    pub facility: Arc<FacilityModel>,
    pub simulator: Simulator,
    pub timeline: SpikeTimeline,
    pub spikes: SpikeRegister,
}

impl AppState {
    pub fn new(policy: ThresholdPolicy, facility: FacilityModel, timeline: SpikeTimeline) -> Self {
        Self {
            policy: Arc::new(policy),
            facility: Arc::new(facility),
            simulator: Simulator,
            timeline,
            spikes: SpikeRegister::new(),
        }
    }
}

/// POST /spike - Start a simulated spike.
///
/// # Request Body
///
/// ```json
/// {
///     "location": "Room 3",
///     "gas": "O2"
/// }
/// ```
///
/// `gas` is optional and defaults to the room's first detector.
///
/// # Response
///
/// `201 Created` with the new event, `400 Bad Request` for an unknown room
/// or a gas the room does not monitor.
#[instrument(skip(state))]
pub async fn post_spike(
    State(state): State<AppState>,
    Json(request): Json<SpikeRequest>,
) -> Result<(StatusCode, Json<SpikeEvent>), StatusCode> {
    let gas = state
        .facility
        .resolve_spike_gas(&request.location, request.gas)
        .map_err(|e| {
            warn!(location = %request.location, error = %e, "Spike request rejected");
            StatusCode::BAD_REQUEST
        })?;

    match state
        .spikes
        .start(&request.location, gas, state.timeline, Utc::now())
        .await
    {
        Ok(event) => {
            info!(
                location = %event.location(),
                gas = %event.gas(),
                duration = event.timeline().duration,
                "Spike started"
            );
            Ok((StatusCode::CREATED, Json(event)))
        }
        Err(e) => {
            warn!(location = %request.location, error = %e, "Failed to start spike");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /spike - The active spike and where it is in its sequence.
///
/// Returns `404 Not Found` when nothing is active. An expired spike is
/// cleared on the way.
#[instrument(skip(state))]
pub async fn get_spike(
    State(state): State<AppState>,
) -> Result<Json<SpikeStatusResponse>, StatusCode> {
    let now = Utc::now();
    state.spikes.clear_if_expired(now).await;

    let event = state.spikes.active().await.ok_or(StatusCode::NOT_FOUND)?;
    let response = SpikeStatusResponse {
        phase: event.phase_at(now),
        intensity: event.intensity_at(now),
        shutter_progress: event.shutter_progress(now),
        due_messages: due_messages(&event, now)
            .into_iter()
            .map(|n| n.text)
            .collect(),
        event,
    };
    Ok(Json(response))
}

/// DELETE /spike - Clear the active spike.
#[instrument(skip(state))]
pub async fn delete_spike(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(event) = state.spikes.clear().await {
        info!(location = %event.location(), gas = %event.gas(), "Spike cleared by operator");
    }
    StatusCode::NO_CONTENT
}

/// GET /snapshot - Evaluate every detector at one instant.
///
/// # Query Parameters
///
/// - `at` (optional): RFC 3339 instant to evaluate at (default: now)
/// - `room` (optional): restrict to one room
///
/// Returns `404 Not Found` for an unknown room.
///
/// Expiry of the stored spike is judged against the wall clock only; an
/// `at` in the future hides the spike from this response but leaves it in
/// place.
#[instrument(skip(state))]
pub async fn get_snapshot(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<FacilitySnapshot>, StatusCode> {
    state.spikes.clear_if_expired(Utc::now()).await;
    let now = query.at.unwrap_or_else(Utc::now);
    let spike = state.spikes.active().await;

    match compute_snapshot(
        &state.policy,
        &state.facility,
        &state.simulator,
        spike.as_ref(),
        query.room.as_deref(),
        now,
    ) {
        Ok(snapshot) => {
            info!(
                detectors = snapshot.detectors.len(),
                overall = ?snapshot.overall,
                spike_active = snapshot.active_spike.is_some(),
                "Snapshot computed"
            );
            Ok(Json(snapshot))
        }
        Err(HazardError::UnknownLocation(room)) => {
            warn!(room = %room, "Snapshot requested for unknown room");
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            warn!(error = %e, "Failed to compute snapshot");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /classify - Classify a single reading.
///
/// Returns `422 Unprocessable Entity` when the reading is out of range.
#[instrument(skip(state))]
pub async fn post_classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, StatusCode> {
    match state.policy.classify(request.gas, request.value) {
        Ok(status) => Ok(Json(ClassifyResponse {
            gas: request.gas,
            value: request.value,
            status,
        })),
        Err(e @ HazardError::InvalidReading { .. }) => {
            warn!(error = %e, "Reading rejected");
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(e) => {
            warn!(error = %e, "Classification failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /facility - Rooms, layout and detectors.
pub async fn get_facility(State(state): State<AppState>) -> Json<FacilityModel> {
    Json(state.facility.as_ref().clone())
}

/// GET /thresholds - The loaded threshold table.
pub async fn get_thresholds(State(state): State<AppState>) -> Json<ThresholdPolicy> {
    Json(state.policy.as_ref().clone())
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
