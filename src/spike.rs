//! Spike events and their lifecycle.
//!
//! A spike is a scripted, fixed-length hazard event. Once created it never
//! changes: phase, intensity, shutter position and the simulated reading
//! bump are all pure functions of `now - start_time`, so any tick source
//! (timer, render loop, HTTP poll) gets the same answer for the same instant.
//!
//! ```text
//!  0        shutters_at   +ramp          fade_after        duration
//!  |-- rising --|-- closing --|-- isolated --|-- ventilating --|
//!  detected                                                 recovered
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HazardError, HazardResult};
use crate::model::{GasKind, LifecyclePhase, ThresholdConfig, ThresholdMode};

/// Intensity overshoot factor while the spike develops.
const RISE_GAIN: f64 = 1.2;

/// Timeline offsets of a spike, in seconds from its start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeTimeline {
    /// Total length of the sequence.
    pub duration: f64,

    /// When the alarm fires and the shutters start to close.
    pub shutters_at: f64,

    /// When ventilation takes over and intensity starts to decay.
    pub fade_after: f64,

    /// How long the shutters take to close.
    pub shutter_ramp: f64,
}

impl Default for SpikeTimeline {
    fn default() -> Self {
        Self {
            duration: 14.0,
            shutters_at: 5.0,
            fade_after: 9.0,
            shutter_ramp: 0.8,
        }
    }
}

impl SpikeTimeline {
    /// Check that the offsets are finite and ordered
    /// `0 < shutters_at <= fade_after < duration`.
    pub fn validate(&self) -> HazardResult<()> {
        let values = [
            self.duration,
            self.shutters_at,
            self.fade_after,
            self.shutter_ramp,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(HazardError::InvalidTimeline(
                "offsets must be finite".to_string(),
            ));
        }
        if self.shutters_at <= 0.0 {
            return Err(HazardError::InvalidTimeline(format!(
                "shutters_at ({}) must be positive",
                self.shutters_at
            )));
        }
        if self.fade_after < self.shutters_at {
            return Err(HazardError::InvalidTimeline(format!(
                "fade_after ({}) must not precede shutters_at ({})",
                self.fade_after, self.shutters_at
            )));
        }
        if self.duration <= self.fade_after {
            return Err(HazardError::InvalidTimeline(format!(
                "duration ({}) must exceed fade_after ({})",
                self.duration, self.fade_after
            )));
        }
        if self.shutter_ramp <= 0.0 {
            return Err(HazardError::InvalidTimeline(
                "shutter_ramp must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// One simulated hazard event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpikeEvent {
    location: String,
    gas: GasKind,
    start_time: DateTime<Utc>,
    timeline: SpikeTimeline,
}

impl SpikeEvent {
    pub fn new(
        location: impl Into<String>,
        gas: GasKind,
        start_time: DateTime<Utc>,
        timeline: SpikeTimeline,
    ) -> HazardResult<Self> {
        timeline.validate()?;
        Ok(Self {
            location: location.into(),
            gas,
            start_time,
            timeline,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn gas(&self) -> GasKind {
        self.gas
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn timeline(&self) -> &SpikeTimeline {
        &self.timeline
    }

    /// Seconds since the spike started; negative before it starts.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        let delta = now - self.start_time;
        match delta.num_microseconds() {
            Some(micros) => micros as f64 / 1_000_000.0,
            None => delta.num_milliseconds() as f64 / 1_000.0,
        }
    }

    /// True once the whole sequence has played out.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.elapsed_secs(now) > self.timeline.duration
    }

    /// True if the spike concerns this room and gas.
    pub fn affects(&self, location: &str, gas: GasKind) -> bool {
        self.gas == gas && self.location == location
    }

    /// Lifecycle phase at `now`.
    pub fn phase_at(&self, now: DateTime<Utc>) -> LifecyclePhase {
        let elapsed = self.elapsed_secs(now);
        let t = &self.timeline;

        if elapsed < 0.0 || elapsed > t.duration {
            LifecyclePhase::Inactive
        } else if elapsed == 0.0 {
            LifecyclePhase::Detected
        } else if elapsed < t.shutters_at {
            LifecyclePhase::Rising
        } else if elapsed < t.fade_after {
            if elapsed - t.shutters_at < t.shutter_ramp {
                LifecyclePhase::ShuttersClosing
            } else {
                LifecyclePhase::Isolated
            }
        } else if elapsed < t.duration {
            LifecyclePhase::Ventilating
        } else {
            LifecyclePhase::Recovered
        }
    }

    /// Normalized magnitude in `[0, 1]`.
    ///
    /// Rises as `1.2 * elapsed / duration` (capped at 1) until `fade_after`,
    /// then decays linearly to zero at `duration`.
    pub fn intensity_at(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = self.elapsed_secs(now);
        let t = &self.timeline;

        if elapsed < 0.0 || elapsed > t.duration {
            return 0.0;
        }
        if elapsed <= t.fade_after {
            (RISE_GAIN * elapsed / t.duration).min(1.0)
        } else {
            (1.0 - (elapsed - t.fade_after) / (t.duration - t.fade_after)).clamp(0.0, 1.0)
        }
    }

    /// How far the shutters have closed, in `[0, 1]`. Zero when inactive.
    pub fn shutter_progress(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = self.elapsed_secs(now);
        let t = &self.timeline;

        if elapsed < t.shutters_at || elapsed > t.duration {
            return 0.0;
        }
        ((elapsed - t.shutters_at) / t.shutter_ramp).min(1.0)
    }

    /// Perturbation to add to a detector reading at `now`.
    ///
    /// Zero unless the spike is active and matches both the room and the
    /// gas. Otherwise grows linearly with elapsed time and reaches the full
    /// `spike_amplitude` when the shutters start to close. Negative for
    /// low-trip gases so the reading falls towards the alarm level.
    pub fn reading_bump(
        &self,
        now: DateTime<Utc>,
        location: &str,
        gas: GasKind,
        config: &ThresholdConfig,
    ) -> f64 {
        if !self.affects(location, gas) || !self.phase_at(now).is_active() {
            return 0.0;
        }

        let ramp = (self.elapsed_secs(now) / self.timeline.shutters_at).min(1.0);
        let magnitude = config.spike_amplitude * ramp;
        match config.mode {
            ThresholdMode::HighTrip => magnitude,
            ThresholdMode::LowTrip => -magnitude,
        }
    }
}
