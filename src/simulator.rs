//! Synthetic detector signal.
//!
//! Stands in for real sensor acquisition: each gas gets a gentle sinusoidal
//! wobble around a healthy nominal level. The value is a pure function of
//! time so repeated ticks at the same instant agree.

use chrono::{DateTime, Utc};

use crate::model::{DetectorReading, GasKind};

/// Shape of the baseline signal for one gas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalProfile {
    /// Centre of the wobble.
    pub nominal: f64,
    /// Peak deviation from nominal.
    pub swing: f64,
    /// Time constant of the sine, in seconds.
    pub period_secs: f64,
}

impl SignalProfile {
    pub fn for_gas(gas: GasKind) -> Self {
        let (nominal, swing, period_secs) = match gas {
            GasKind::O2 => (20.8, 0.2, 2.2),
            GasKind::CO => (10.0, 6.0, 1.5),
            GasKind::H2S => (2.0, 1.0, 1.5),
            GasKind::CH4 => (4.0, 2.0, 1.1),
            GasKind::NH3 => (10.0, 6.0, 1.5),
            GasKind::Ethanol => (120.0, 40.0, 1.5),
        };
        Self {
            nominal,
            swing,
            period_secs,
        }
    }

    /// Value at `t` seconds, shifted by `phase` radians.
    pub fn value_at(&self, t: f64, phase: f64) -> f64 {
        self.nominal + self.swing * (t / self.period_secs + phase).sin()
    }
}

/// Produces readings for the facility's detectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulator;

impl Simulator {
    /// Baseline reading for one detector. `slot` spreads the phase so that
    /// detectors of the same gas do not move in lockstep.
    pub fn reading(
        &self,
        detector_id: &str,
        gas: GasKind,
        slot: usize,
        now: DateTime<Utc>,
    ) -> DetectorReading {
        let t = now.timestamp_millis() as f64 / 1_000.0;
        let value = SignalProfile::for_gas(gas).value_at(t, slot as f64 * 0.7);
        DetectorReading {
            detector_id: detector_id.to_string(),
            gas,
            value,
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SafetyStatus;
    use crate::policy::ThresholdPolicy;
    use chrono::TimeZone;

    #[test]
    fn test_baseline_stays_healthy() {
        let policy = ThresholdPolicy::default();
        let simulator = Simulator;
        for gas in GasKind::ALL {
            for ms in (0..20_000).step_by(250) {
                let now = Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap();
                let reading = simulator.reading("probe", gas, 3, now);
                assert_eq!(
                    policy.classify(gas, reading.value).unwrap(),
                    SafetyStatus::Healthy,
                    "{gas} baseline {} not healthy",
                    reading.value
                );
            }
        }
    }

    #[test]
    fn test_reading_is_deterministic() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let a = Simulator.reading("Room 2: CO", GasKind::CO, 0, now);
        let b = Simulator.reading("Room 2: CO", GasKind::CO, 0, now);
        assert_eq!(a, b);
        assert_eq!(a.timestamp, now);
        assert_eq!(a.detector_id, "Room 2: CO");
    }

    #[test]
    fn test_value_within_swing() {
        let profile = SignalProfile::for_gas(GasKind::Ethanol);
        for step in 0..100 {
            let value = profile.value_at(f64::from(step) * 0.37, 0.0);
            assert!((value - profile.nominal).abs() <= profile.swing + 1e-9);
        }
    }
}
