//! Magnetic/gravimetric sensor fusion with manifest mass cross-checks.
//!
//! Each sample contributes two independent terms to an anomaly sum:
//!
//! ```text
//! delta_i = |mag_i - grav_i|                       counted when delta_i > tau
//! mass_i  = |grav_i * mass_calibration - w_i|      counted when mass_i > mass_tolerance
//! score   = sum / n
//! ```
//!
//! When locations are supplied, `delta_i * (1 + |loc_i| / distance_scale)` is
//! also computed. It only replaces `delta_i` in the sum when
//! [`FusionConfig::location_scaling`] is set; the default keeps the reference
//! behavior where the scaled value is discarded.

use serde::{Deserialize, Serialize};

use crate::config::FusionConfig;
use crate::error::ScoringError;

/// Planar sample position. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance from the origin.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl From<[f64; 2]> for Location {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Location> for [f64; 2] {
    fn from(loc: Location) -> Self {
        [loc.x, loc.y]
    }
}

/// Scores paired magnetic and gravimetric readings.
#[derive(Debug, Clone, Default)]
pub struct FusionScorer {
    config: FusionConfig,
}

impl FusionScorer {
    pub fn new(config: FusionConfig) -> Self {
        if config.location_scaling {
            log::warn!("location scaling enabled: scaled deltas replace raw deltas in the sum");
        }
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Mean anomaly per sample.
    ///
    /// All lengths are validated before anything is summed; an empty `mag`
    /// is an error rather than a NaN.
    pub fn fuse(
        &self,
        mag: &[f64],
        grav: &[f64],
        locations: Option<&[Location]>,
        manifest_weights: Option<&[f64]>,
    ) -> Result<f64, ScoringError> {
        let n = mag.len();
        check_len("grav", n, grav.len())?;
        if let Some(locs) = locations {
            check_len("locations", n, locs.len())?;
        }
        if let Some(w) = manifest_weights {
            check_len("manifest_weights", n, w.len())?;
        }
        if n == 0 {
            return Err(ScoringError::EmptyInput { what: "mag" });
        }

        let cfg = &self.config;
        let mut anomaly = 0.0;
        for i in 0..n {
            let delta = (mag[i] - grav[i]).abs();
            let mut contribution = delta;

            if let Some(locs) = locations {
                let scaled = delta * (1.0 + locs[i].norm() / cfg.distance_scale);
                if cfg.location_scaling {
                    contribution = scaled;
                }
            }
            if delta > cfg.tau {
                anomaly += contribution;
            }

            if let Some(weights) = manifest_weights {
                let sensor_mass = grav[i] * cfg.mass_calibration;
                let mass_delta = (sensor_mass - weights[i]).abs();
                if mass_delta > cfg.mass_tolerance {
                    anomaly += mass_delta;
                }
            }
        }

        let score = anomaly / n as f64;
        log::debug!("fused {n} samples: anomaly={score:.6}");
        Ok(score)
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), ScoringError> {
    if expected == got {
        Ok(())
    } else {
        Err(ScoringError::ShapeMismatch {
            what,
            expected,
            got,
        })
    }
}
