//! Per-tick snapshot assembly.
//!
//! A tick reads the clock once, samples every detector, applies the active
//! spike's bump, classifies the result, and attaches the spike's phase,
//! intensity and due messages to the detectors it affects. Nothing computed
//! here is kept between ticks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::{HazardError, HazardResult};
use crate::facility::FacilityModel;
use crate::model::{GasKind, LifecyclePhase, SafetyStatus};
use crate::notify::due_messages;
use crate::policy::ThresholdPolicy;
use crate::simulator::Simulator;
use crate::spike::SpikeEvent;

/// State of one detector at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorSnapshot {
    pub detector_id: String,
    pub location: String,
    pub gas: GasKind,
    pub value: f64,
    pub units: String,

    /// Classified status; empty when the reading was rejected.
    pub status: Option<SafetyStatus>,

    /// Set when the reading could not be classified.
    pub sensor_fault: bool,

    pub phase: LifecyclePhase,
    pub intensity: f64,
    pub shutter_progress: f64,
    pub due_messages: Vec<String>,
}

/// State of the facility at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct FacilitySnapshot {
    pub timestamp: DateTime<Utc>,

    /// The spike being played out, if it has not expired.
    pub active_spike: Option<SpikeEvent>,

    /// Worst status across the detectors that produced a valid reading.
    /// Faulted detectors do not count towards it; see `faults`.
    pub overall: SafetyStatus,

    /// Number of detectors whose reading was rejected this tick.
    pub faults: usize,

    pub detectors: Vec<DetectorSnapshot>,
}

/// Evaluate a single detector.
///
/// Fails only on configuration problems; an unclassifiable reading is
/// reported as a sensor fault instead.
pub fn evaluate_detector(
    policy: &ThresholdPolicy,
    location: &str,
    detector_id: &str,
    gas: GasKind,
    raw_value: f64,
    spike: Option<&SpikeEvent>,
    now: DateTime<Utc>,
) -> HazardResult<DetectorSnapshot> {
    let config = policy.config(gas)?;
    let affected = spike.filter(|event| event.affects(location, gas));

    let value = raw_value
        + affected.map_or(0.0, |event| event.reading_bump(now, location, gas, config));

    let (status, sensor_fault) = match policy.classify(gas, value) {
        Ok(status) => (Some(status), false),
        Err(e @ HazardError::InvalidReading { .. }) => {
            warn!(detector = %detector_id, error = %e, "Rejected detector reading");
            (None, true)
        }
        Err(e) => return Err(e),
    };

    let (phase, intensity, shutter_progress, messages) = match affected {
        Some(event) => (
            event.phase_at(now),
            event.intensity_at(now),
            event.shutter_progress(now),
            due_messages(event, now).into_iter().map(|n| n.text).collect(),
        ),
        None => (LifecyclePhase::Inactive, 0.0, 0.0, Vec::new()),
    };

    Ok(DetectorSnapshot {
        detector_id: detector_id.to_string(),
        location: location.to_string(),
        gas,
        value,
        units: config.units.clone(),
        status,
        sensor_fault,
        phase,
        intensity,
        shutter_progress,
        due_messages: messages,
    })
}

/// Build the snapshot for the whole facility, or one room of it.
pub fn compute_snapshot(
    policy: &ThresholdPolicy,
    facility: &FacilityModel,
    simulator: &Simulator,
    spike: Option<&SpikeEvent>,
    room: Option<&str>,
    now: DateTime<Utc>,
) -> HazardResult<FacilitySnapshot> {
    if let Some(name) = room {
        facility.room(name)?;
    }

    let spike = spike.filter(|event| !event.is_expired(now));
    let mut detectors = Vec::new();

    for (slot, (r, detector)) in facility.detectors().enumerate() {
        if room.is_some_and(|name| name != r.name) {
            continue;
        }
        let reading = simulator.reading(&detector.id, detector.gas, slot, now);
        detectors.push(evaluate_detector(
            policy,
            &r.name,
            &reading.detector_id,
            reading.gas,
            reading.value,
            spike,
            now,
        )?);
    }

    let overall = detectors
        .iter()
        .filter_map(|d| d.status)
        .max()
        .unwrap_or(SafetyStatus::Healthy);
    let faults = detectors.iter().filter(|d| d.sensor_fault).count();
    if faults > 0 {
        warn!(faults, "Snapshot has faulted detectors");
    }

    Ok(FacilitySnapshot {
        timestamp: now,
        active_spike: spike.cloned(),
        overall,
        faults,
        detectors,
    })
}
