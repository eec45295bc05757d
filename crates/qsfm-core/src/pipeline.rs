//! One scan, end to end.
//!
//! ```text
//! manifests ─► extract_weights ─┐
//! mag, grav, locations ─────────┴► FusionScorer ─► local anomaly ─┐
//! signals ─► EntropyRateEstimator ─► local entropy ───────────────┼► ExternalSignalFuser
//! MeasurementProvider ─► ExternalMeasurement ─────────────────────┘          │
//!                                                        seized estimate ◄───┤
//!                                                        AuditSink ◄─────────┘
//! ```
//!
//! Every stage validates before the audit sink is touched, so a rejected scan
//! never leaves a record behind.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditSink;
use crate::config::ScanConfig;
use crate::entropy_rate::{EntropyRateEstimator, SignalWindow};
use crate::error::PipelineError;
use crate::external::{ExternalMeasurement, ExternalSignalFuser, MeasurementProvider};
use crate::fusion::{FusionScorer, Location};
use crate::manifest::{extract_weights, mean_mass_mismatch};

/// Raw inputs for one scan. Deserializable from a JSON request file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub mag: Vec<f64>,
    pub grav: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests: Option<Vec<String>>,
    #[serde(default)]
    pub signals: Vec<SignalWindow>,
    /// Overrides the pipeline's measurement provider for this scan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalMeasurement>,
}

impl ScanRequest {
    /// Parse a JSON request.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Everything computed for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: String,
    pub timestamp: String,
    pub samples: usize,
    pub local_anomaly: f64,
    pub local_entropy: f64,
    pub combined_anomaly: f64,
    /// `combined_anomaly * 100`.
    pub anomaly_pct: f64,
    pub combined_entropy: f64,
    pub seized_kg: f64,
    pub fidelity: f64,
    pub low_fidelity: bool,
    /// Mean |sensor mass - declared mass|, when manifests were supplied.
    pub manifest_mismatch_kg: Option<f64>,
    pub external: ExternalMeasurement,
    /// Byte-sum checksum of the audit record. Not a signature.
    pub checksum: String,
}

impl ScanReport {
    /// Device integrity tag as `0x`-prefixed hex.
    pub fn integrity_tag_hex(&self) -> String {
        format!("{:#010x}", self.external.integrity_tag)
    }
}

/// Scorers, measurement provider, and audit sink for repeated scans.
pub struct ScanPipeline<P, A> {
    fusion: FusionScorer,
    entropy: EntropyRateEstimator,
    external: ExternalSignalFuser,
    seized_factor: f64,
    provider: P,
    audit: A,
}

impl<P: MeasurementProvider, A: AuditSink> ScanPipeline<P, A> {
    pub fn new(config: &ScanConfig, provider: P, audit: A) -> Self {
        Self {
            fusion: FusionScorer::new(config.fusion),
            entropy: EntropyRateEstimator::new(config.entropy),
            external: ExternalSignalFuser::new(config.external),
            seized_factor: config.pipeline.seized_factor,
            provider,
            audit,
        }
    }

    /// Score a request and append its audit record.
    pub fn run(
        &mut self,
        request: &ScanRequest,
        timestamp: &str,
    ) -> Result<ScanReport, PipelineError> {
        let weights = request.manifests.as_deref().map(extract_weights);

        let local_anomaly = self.fusion.fuse(
            &request.mag,
            &request.grav,
            request.locations.as_deref(),
            weights.as_deref(),
        )?;
        let entropy = self.entropy.estimate_detailed(&request.signals)?;

        let measurement = match request.external {
            Some(m) => m,
            None => self.provider.provide_measurement(),
        };
        let combined = self
            .external
            .combine(local_anomaly, entropy.score, &measurement)?;
        let seized_kg = combined.anomaly * 100.0 * self.seized_factor;

        let record = self
            .audit
            .append(timestamp, combined.anomaly, combined.entropy, seized_kg)?;

        let manifest_mismatch_kg = weights.as_deref().map(|w| {
            mean_mass_mismatch(&request.grav, w, self.fusion.config().mass_calibration)
        });
        if let Some(m) = manifest_mismatch_kg {
            log::debug!("manifest mismatch: mean {m:.4} kg");
        }
        log::info!(
            "scan scored: anomaly={:.6} entropy={:.6} seized={:.3}kg (provider {})",
            combined.anomaly,
            combined.entropy,
            seized_kg,
            self.provider.name()
        );

        Ok(ScanReport {
            scan_id: Uuid::new_v4().to_string(),
            timestamp: record.timestamp,
            samples: request.mag.len(),
            local_anomaly,
            local_entropy: entropy.score,
            combined_anomaly: combined.anomaly,
            anomaly_pct: combined.anomaly * 100.0,
            combined_entropy: combined.entropy,
            seized_kg,
            fidelity: entropy.fidelity,
            low_fidelity: entropy.penalized,
            manifest_mismatch_kg,
            external: measurement,
            checksum: record.checksum.to_string(),
        })
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Release the audit sink, e.g. to close a writer explicitly.
    pub fn into_audit(self) -> A {
        self.audit
    }
}
