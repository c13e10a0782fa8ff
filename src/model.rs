//! Data models for the hazard HMI core.
//!
//! Everything here is either configuration (loaded once, read-only) or a
//! value derived on demand from a reading and the active spike. Nothing in
//! this module holds mutable state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::spike::SpikeEvent;

/// The gases monitored across the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GasKind {
    O2,
    CO,
    H2S,
    CH4,
    NH3,
    Ethanol,
}

impl GasKind {
    /// Every gas kind, in a stable order.
    pub const ALL: [GasKind; 6] = [
        GasKind::O2,
        GasKind::CO,
        GasKind::H2S,
        GasKind::CH4,
        GasKind::NH3,
        GasKind::Ethanol,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GasKind::O2 => "O2",
            GasKind::CO => "CO",
            GasKind::H2S => "H2S",
            GasKind::CH4 => "CH4",
            GasKind::NH3 => "NH3",
            GasKind::Ethanol => "Ethanol",
        }
    }
}

impl fmt::Display for GasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Threshold polarity.
///
/// `HighTrip` alarms when the reading climbs above the levels (toxic and
/// flammable gases), `LowTrip` when it falls below them (oxygen depletion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    #[serde(alias = "high")]
    HighTrip,
    #[serde(alias = "low")]
    LowTrip,
}

/// Two-level threshold configuration for one gas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub mode: ThresholdMode,

    /// Level at which the detector enters WARN.
    pub warn_level: f64,

    /// Level at which the detector enters ALARM.
    pub alarm_level: f64,

    /// Display units, e.g. "ppm", "%vol", "%LEL".
    pub units: String,

    /// Largest physically meaningful reading, if the units have one.
    #[serde(default)]
    pub max_reading: Option<f64>,

    /// How far a fully developed simulated spike moves the reading.
    #[serde(default)]
    pub spike_amplitude: f64,
}

/// Safety status derived from a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyStatus {
    /// Reading is on the safe side of the warn level.
    Healthy,

    /// Reading has crossed the warn level but not the alarm level.
    Warn,

    /// Reading has crossed the alarm level.
    Alarm,
}

/// Stage of a spike's scripted mitigation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// The instant the spike starts.
    Detected,
    /// Concentration climbing, shutters still open.
    Rising,
    /// Shutters are sliding shut.
    ShuttersClosing,
    /// Shutters closed, the room is sealed off.
    Isolated,
    /// Extraction running, concentration decaying.
    Ventilating,
    /// The final instant of the sequence.
    Recovered,
    /// No spike in progress (not started yet, or already over).
    Inactive,
}

impl LifecyclePhase {
    pub fn is_active(self) -> bool {
        self != LifecyclePhase::Inactive
    }
}

/// A single sample from a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorReading {
    pub detector_id: String,
    pub gas: GasKind,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Request body for POST /spike.
#[derive(Debug, Clone, Deserialize)]
pub struct SpikeRequest {
    /// Room to raise the spike in.
    pub location: String,

    /// Gas to spike. Defaults to the room's first detector.
    #[serde(default)]
    pub gas: Option<GasKind>,
}

/// Response for GET /spike.
#[derive(Debug, Clone, Serialize)]
pub struct SpikeStatusResponse {
    pub event: SpikeEvent,
    pub phase: LifecyclePhase,
    pub intensity: f64,
    pub shutter_progress: f64,
    pub due_messages: Vec<String>,
}

/// Request body for POST /classify.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub gas: GasKind,
    pub value: f64,
}

/// Response for POST /classify.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub gas: GasKind,
    pub value: f64,
    pub status: SafetyStatus,
}

/// Query parameters for GET /snapshot.
#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    /// Instant to evaluate at (default: now).
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,

    /// Restrict the snapshot to a single room.
    #[serde(default)]
    pub room: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_kind_labels_round_trip_through_serde() {
        for gas in GasKind::ALL {
            let json = serde_json::to_string(&gas).unwrap();
            assert_eq!(json, format!("\"{}\"", gas));
        }
        let parsed: GasKind = serde_json::from_str("\"Ethanol\"").unwrap();
        assert_eq!(parsed, GasKind::Ethanol);
    }

    #[test]
    fn test_threshold_mode_accepts_short_aliases() {
        let low: ThresholdMode = serde_json::from_str("\"low\"").unwrap();
        let high: ThresholdMode = serde_json::from_str("\"high_trip\"").unwrap();
        assert_eq!(low, ThresholdMode::LowTrip);
        assert_eq!(high, ThresholdMode::HighTrip);
    }

    #[test]
    fn test_threshold_config_optional_fields_default() {
        let cfg: ThresholdConfig = serde_json::from_str(
            r#"{"mode":"high","warn_level":35.0,"alarm_level":50.0,"units":"ppm"}"#,
        )
        .unwrap();
        assert_eq!(cfg.max_reading, None);
        assert_eq!(cfg.spike_amplitude, 0.0);
    }

    #[test]
    fn test_safety_status_ordering() {
        assert!(SafetyStatus::Healthy < SafetyStatus::Warn);
        assert!(SafetyStatus::Warn < SafetyStatus::Alarm);
        assert_eq!(
            serde_json::to_string(&SafetyStatus::Alarm).unwrap(),
            "\"alarm\""
        );
    }

    #[test]
    fn test_phase_activity() {
        assert!(LifecyclePhase::Detected.is_active());
        assert!(LifecyclePhase::Recovered.is_active());
        assert!(!LifecyclePhase::Inactive.is_active());
    }
}
