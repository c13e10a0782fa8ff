//! Process configuration, read once at start-up from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `HAZARD_PORT` | 3000 |
//! | `HAZARD_SPIKE_DURATION` | 14 |
//! | `HAZARD_SHUTTERS_AT` | 5 |
//! | `HAZARD_FADE_AFTER` | 9 |
//! | `HAZARD_SHUTTER_RAMP` | 0.8 |
//! | `HAZARD_THRESHOLDS_PATH` | built-in table |
//!
//! Unparseable numbers fall back to the default. The resulting timeline and
//! threshold table are validated before the server starts.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use tracing::info;

use crate::facility::FacilityModel;
use crate::model::{GasKind, ThresholdConfig};
use crate::policy::ThresholdPolicy;
use crate::spike::SpikeTimeline;

/// Default port if not specified via environment variable.
pub const DEFAULT_PORT: u16 = 3000;

/// Start-up configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub timeline: SpikeTimeline,
    pub thresholds_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeline: SpikeTimeline::default(),
            thresholds_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str, default| parse_or(lookup(key), default);

        Self {
            port: parse_or(lookup("HAZARD_PORT"), defaults.port),
            timeline: SpikeTimeline {
                duration: parsed("HAZARD_SPIKE_DURATION", defaults.timeline.duration),
                shutters_at: parsed("HAZARD_SHUTTERS_AT", defaults.timeline.shutters_at),
                fade_after: parsed("HAZARD_FADE_AFTER", defaults.timeline.fade_after),
                shutter_ramp: parsed("HAZARD_SHUTTER_RAMP", defaults.timeline.shutter_ramp),
            },
            thresholds_path: lookup("HAZARD_THRESHOLDS_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Build the threshold policy from the configured file, or the built-in
    /// table when no file is set.
    pub fn load_policy(&self) -> anyhow::Result<ThresholdPolicy> {
        match &self.thresholds_path {
            Some(path) => load_policy_file(path),
            None => Ok(ThresholdPolicy::default()),
        }
    }

    /// Validate everything needed to serve, returning the policy.
    ///
    /// The timeline must be well ordered and every gas the facility
    /// monitors must have a threshold.
    pub fn validate(&self, facility: &FacilityModel) -> anyhow::Result<ThresholdPolicy> {
        self.timeline.validate()?;
        let policy = self.load_policy()?;
        policy.require(facility.monitored_gases())?;
        Ok(policy)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn load_policy_file(path: &Path) -> anyhow::Result<ThresholdPolicy> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading thresholds from {}", path.display()))?;
    let table: BTreeMap<GasKind, ThresholdConfig> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing thresholds from {}", path.display()))?;

    info!(path = %path.display(), gases = table.len(), "Loaded threshold table");
    Ok(ThresholdPolicy::new(table)?)
}
