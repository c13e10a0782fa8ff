//! Threshold policy: maps a gas reading to a safety status.
//!
//! The policy is built once at start-up, validated, and shared read-only
//! for the lifetime of the process.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{HazardError, HazardResult};
use crate::model::{GasKind, SafetyStatus, ThresholdConfig, ThresholdMode};

/// Per-gas threshold table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdPolicy {
    thresholds: BTreeMap<GasKind, ThresholdConfig>,
}

impl ThresholdPolicy {
    /// Build a policy, rejecting any config that breaks the polarity invariant.
    pub fn new(thresholds: BTreeMap<GasKind, ThresholdConfig>) -> HazardResult<Self> {
        for (gas, config) in &thresholds {
            validate_config(*gas, config)?;
        }
        Ok(Self { thresholds })
    }

    /// Look up the config for a gas.
    pub fn config(&self, gas: GasKind) -> HazardResult<&ThresholdConfig> {
        self.thresholds
            .get(&gas)
            .ok_or(HazardError::MissingThreshold(gas))
    }

    /// Fail with `MissingThreshold` for the first gas that has no config.
    pub fn require<I>(&self, gases: I) -> HazardResult<()>
    where
        I: IntoIterator<Item = GasKind>,
    {
        for gas in gases {
            self.config(gas)?;
        }
        Ok(())
    }

    /// Classify a reading.
    ///
    /// # Thresholds
    ///
    /// - high trip: `value >= alarm` is ALARM, `value >= warn` is WARN
    /// - low trip: `value <= alarm` is ALARM, `value <= warn` is WARN
    /// - anything else is HEALTHY
    ///
    /// Non-finite, negative or out-of-range values are rejected rather than
    /// classified.
    pub fn classify(&self, gas: GasKind, value: f64) -> HazardResult<SafetyStatus> {
        let config = self.config(gas)?;
        check_reading(gas, value, config)?;

        let status = match config.mode {
            ThresholdMode::HighTrip => {
                if value >= config.alarm_level {
                    SafetyStatus::Alarm
                } else if value >= config.warn_level {
                    SafetyStatus::Warn
                } else {
                    SafetyStatus::Healthy
                }
            }
            ThresholdMode::LowTrip => {
                if value <= config.alarm_level {
                    SafetyStatus::Alarm
                } else if value <= config.warn_level {
                    SafetyStatus::Warn
                } else {
                    SafetyStatus::Healthy
                }
            }
        };
        Ok(status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GasKind, &ThresholdConfig)> {
        self.thresholds.iter().map(|(gas, config)| (*gas, config))
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        let table = [
            (GasKind::O2, ThresholdMode::LowTrip, 19.5, 18.0, "%vol", Some(100.0), 3.5),
            (GasKind::CO, ThresholdMode::HighTrip, 35.0, 50.0, "ppm", None, 50.0),
            (GasKind::H2S, ThresholdMode::HighTrip, 10.0, 15.0, "ppm", None, 16.0),
            (GasKind::CH4, ThresholdMode::HighTrip, 10.0, 20.0, "%LEL", Some(100.0), 20.0),
            (GasKind::NH3, ThresholdMode::HighTrip, 25.0, 35.0, "ppm", None, 35.0),
            (GasKind::Ethanol, ThresholdMode::HighTrip, 300.0, 500.0, "ppm", None, 450.0),
        ];

        let thresholds = table
            .into_iter()
            .map(|(gas, mode, warn, alarm, units, max, amplitude)| {
                (
                    gas,
                    ThresholdConfig {
                        mode,
                        warn_level: warn,
                        alarm_level: alarm,
                        units: units.to_string(),
                        max_reading: max,
                        spike_amplitude: amplitude,
                    },
                )
            })
            .collect();

        Self { thresholds }
    }
}

fn validate_config(gas: GasKind, config: &ThresholdConfig) -> HazardResult<()> {
    let invalid = |reason: &str| HazardError::InvalidThreshold {
        gas,
        reason: reason.to_string(),
    };

    if !config.warn_level.is_finite() || !config.alarm_level.is_finite() {
        return Err(invalid("levels must be finite"));
    }
    match config.mode {
        ThresholdMode::HighTrip if config.alarm_level <= config.warn_level => {
            return Err(invalid("high-trip alarm level must be above the warn level"));
        }
        ThresholdMode::LowTrip if config.alarm_level >= config.warn_level => {
            return Err(invalid("low-trip alarm level must be below the warn level"));
        }
        _ => {}
    }
    if !config.spike_amplitude.is_finite() || config.spike_amplitude < 0.0 {
        return Err(invalid("spike amplitude must be a non-negative number"));
    }
    if let Some(max) = config.max_reading {
        if !max.is_finite() || max < config.warn_level.max(config.alarm_level) {
            return Err(invalid("max reading must cover both levels"));
        }
    }
    Ok(())
}

fn check_reading(gas: GasKind, value: f64, config: &ThresholdConfig) -> HazardResult<()> {
    let reject = |reason: &'static str| -> HazardResult<()> {
        Err(HazardError::InvalidReading { gas, value, reason })
    };

    if !value.is_finite() {
        return reject("not a finite number");
    }
    if value < 0.0 {
        return reject("negative concentration");
    }
    if config.max_reading.is_some_and(|max| value > max) {
        return reject("above physical range");
    }
    Ok(())
}
