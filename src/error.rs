//! Error types for the hazard core.

use thiserror::Error;

use crate::model::GasKind;

/// Failures raised by classification, configuration and spike handling.
///
/// Configuration variants indicate a wiring problem and are meant to be
/// caught at start-up. `InvalidReading` is a per-call rejection; callers
/// skip the tick or flag a sensor fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HazardError {
    /// No threshold configured for a gas.
    #[error("no threshold configured for gas {0}")]
    MissingThreshold(GasKind),

    /// Threshold levels violate the polarity invariant.
    #[error("invalid threshold for gas {gas}: {reason}")]
    InvalidThreshold { gas: GasKind, reason: String },

    /// Detector ID absent from the facility table.
    #[error("unknown detector '{0}'")]
    UnknownDetector(String),

    /// Room name absent from the facility table.
    #[error("unknown location '{0}'")]
    UnknownLocation(String),

    /// The room has no detector for the requested gas.
    #[error("gas {gas} is not monitored in '{location}'")]
    GasNotMonitored { gas: GasKind, location: String },

    /// Spike timeline offsets are out of order or non-finite.
    #[error("invalid spike timeline: {0}")]
    InvalidTimeline(String),

    /// Reading is non-finite or outside the physical range.
    #[error("invalid {gas} reading {value}: {reason}")]
    InvalidReading {
        gas: GasKind,
        value: f64,
        reason: &'static str,
    },
}

impl HazardError {
    /// True for the errors that indicate bad configuration rather than bad input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HazardError::MissingThreshold(_)
                | HazardError::InvalidThreshold { .. }
                | HazardError::UnknownDetector(_)
                | HazardError::InvalidTimeline(_)
        )
    }
}

/// Result alias for core operations.
pub type HazardResult<T> = Result<T, HazardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = HazardError::MissingThreshold(GasKind::H2S);
        assert_eq!(err.to_string(), "no threshold configured for gas H2S");

        let err = HazardError::InvalidReading {
            gas: GasKind::O2,
            value: f64::NAN,
            reason: "not a finite number",
        };
        assert!(err.to_string().contains("O2"));
        assert!(err.to_string().contains("not a finite number"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(HazardError::MissingThreshold(GasKind::CO).is_configuration());
        assert!(HazardError::UnknownDetector("X".into()).is_configuration());
        assert!(
            !HazardError::InvalidReading {
                gas: GasKind::CO,
                value: -1.0,
                reason: "negative",
            }
            .is_configuration()
        );
        assert!(!HazardError::UnknownLocation("Attic".into()).is_configuration());
    }
}
