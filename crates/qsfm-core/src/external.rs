//! Auxiliary measurements from an external acquisition device.
//!
//! The device (an ASIC, FPGA, or anything else) is reached only through the
//! [`MeasurementProvider`] capability and reports three already-sampled
//! scalars. Its values are untrusted but are taken at face value unless an
//! [`ExternalConfig`] bound is set.

use serde::{Deserialize, Serialize};

use crate::config::ExternalConfig;
use crate::error::ScoringError;

/// Three scalars reported by an external device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMeasurement {
    /// Anomaly in percent-like units (140 means 1.40).
    pub anomaly_raw: i64,
    /// Entropy contribution in the same units as the local entropy score.
    pub entropy_raw: i64,
    /// Opaque device tag. Carried into reports, never interpreted.
    pub integrity_tag: u32,
}

impl ExternalMeasurement {
    /// A measurement that contributes nothing.
    pub const ZERO: Self = Self {
        anomaly_raw: 0,
        entropy_raw: 0,
        integrity_tag: 0,
    };
}

/// Capability interface over whatever produces external measurements.
pub trait MeasurementProvider {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "external"
    }

    /// Sample the device once.
    fn provide_measurement(&self) -> ExternalMeasurement;
}

/// Provider that always returns the same measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMeasurement(pub ExternalMeasurement);

impl FixedMeasurement {
    /// Values reported by the reference hardware-integration mock.
    pub const REFERENCE: Self = Self(ExternalMeasurement {
        anomaly_raw: 140,
        entropy_raw: 450_000,
        integrity_tag: 0xABCD_EF01,
    });
}

impl Default for FixedMeasurement {
    fn default() -> Self {
        Self(ExternalMeasurement::ZERO)
    }
}

impl MeasurementProvider for FixedMeasurement {
    fn name(&self) -> &str {
        "fixed"
    }

    fn provide_measurement(&self) -> ExternalMeasurement {
        self.0
    }
}

/// Local scores merged with an external measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedMetrics {
    pub anomaly: f64,
    pub entropy: f64,
}

/// Merges local scores with an external measurement.
#[derive(Debug, Clone, Default)]
pub struct ExternalSignalFuser {
    config: ExternalConfig,
}

impl ExternalSignalFuser {
    pub fn new(config: ExternalConfig) -> Self {
        Self { config }
    }

    /// `anomaly = local + anomaly_raw / 100`, `entropy = local + entropy_raw`.
    pub fn combine(
        &self,
        local_anomaly: f64,
        local_entropy: f64,
        external: &ExternalMeasurement,
    ) -> Result<CombinedMetrics, ScoringError> {
        let anomaly_pct = external.anomaly_raw as f64;
        let entropy = external.entropy_raw as f64;
        check_bound("anomaly_raw", anomaly_pct, self.config.max_anomaly_pct)?;
        check_bound("entropy_raw", entropy, self.config.max_entropy)?;

        Ok(CombinedMetrics {
            anomaly: local_anomaly + anomaly_pct / 100.0,
            entropy: local_entropy + entropy,
        })
    }
}

fn check_bound(field: &'static str, value: f64, limit: Option<f64>) -> Result<(), ScoringError> {
    match limit {
        Some(limit) if value.abs() > limit => Err(ScoringError::ExternalOutOfRange {
            field,
            value,
            limit,
        }),
        _ => Ok(()),
    }
}
