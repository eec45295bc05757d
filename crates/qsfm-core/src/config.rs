//! Tunable constants for every scoring stage.
//!
//! Defaults reproduce the reference scoring behavior exactly. A config file is
//! plain JSON; every section and field is optional and falls back to its
//! default:
//!
//! ```json
//! {
//!   "fusion": { "tau": 1e-9, "location_scaling": true },
//!   "entropy": { "dt": 1e-6 },
//!   "external": { "max_anomaly_pct": 500 },
//!   "pipeline": { "audit_log": "/var/log/qsfm/audits.txt" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default audit log file name, relative to the working directory.
pub const DEFAULT_AUDIT_LOG: &str = "qsfm_audits.txt";

/// Sensor fusion parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FusionConfig {
    /// Magnetic/gravimetric deltas at or below this contribute nothing.
    pub tau: f64,
    /// Gravimetric reading (gal) to kilograms.
    pub mass_calibration: f64,
    /// Mass deltas at or below this (kg) are ignored.
    pub mass_tolerance: f64,
    /// Distance divisor for the location scale factor `1 + |loc| / distance_scale`.
    pub distance_scale: f64,
    /// Fold the location-scaled delta into the anomaly sum.
    ///
    /// Off by default: the reference scorer computes the scaled delta and then
    /// discards it.
    pub location_scaling: bool,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            tau: 1e-9,
            mass_calibration: 1e5,
            mass_tolerance: 1e-3,
            distance_scale: 1e3,
            location_scaling: false,
        }
    }
}

/// Entropy-rate estimator parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntropyConfig {
    /// Sampling interval between consecutive windows, in seconds.
    pub dt: f64,
    /// Rates at or below this are not counted as anomalous.
    pub tau: f64,
    /// Offset inside `ln` to keep `x ln x` finite at zero.
    pub epsilon: f64,
    /// Fidelity drop per unit of accumulated anomaly.
    pub fidelity_slope: f64,
    /// Fidelity below this triggers the penalty.
    pub fidelity_threshold: f64,
    /// Multiplier applied once to the anomaly total on low fidelity.
    pub penalty: f64,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            dt: 1e-6,
            tau: 0.01,
            epsilon: 1e-10,
            fidelity_slope: 0.1,
            fidelity_threshold: 0.9,
            penalty: 1.2,
        }
    }
}

/// Optional sanity bounds on the external measurement.
///
/// Both are unset by default, which trusts the external source for magnitude.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExternalConfig {
    pub max_anomaly_pct: Option<f64>,
    pub max_entropy: Option<f64>,
}

/// End-to-end pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seized-mass estimate is `combined_anomaly * 100 * seized_factor` kg.
    pub seized_factor: f64,
    pub audit_log: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seized_factor: 0.8,
            audit_log: PathBuf::from(DEFAULT_AUDIT_LOG),
        }
    }
}

/// Complete scan configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    pub fusion: FusionConfig,
    pub entropy: EntropyConfig,
    pub external: ExternalConfig,
    pub pipeline: PipelineConfig,
}

impl ScanConfig {
    /// Load and validate a JSON config file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations that make a stage divide by zero or
    /// silently invert its thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.fusion;
        let e = &self.entropy;
        let checks: [(bool, &str); 7] = [
            (f.tau >= 0.0, "fusion.tau must be >= 0"),
            (f.mass_tolerance >= 0.0, "fusion.mass_tolerance must be >= 0"),
            (f.distance_scale > 0.0, "fusion.distance_scale must be > 0"),
            (e.dt > 0.0, "entropy.dt must be > 0"),
            (e.tau >= 0.0, "entropy.tau must be >= 0"),
            (e.epsilon > 0.0, "entropy.epsilon must be > 0"),
            (e.penalty >= 1.0, "entropy.penalty must be >= 1"),
        ];
        for (ok, msg) in checks {
            if !ok {
                return Err(ConfigError::Invalid(msg.to_string()));
            }
        }
        if self.pipeline.seized_factor < 0.0 {
            return Err(ConfigError::Invalid(
                "pipeline.seized_factor must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}
