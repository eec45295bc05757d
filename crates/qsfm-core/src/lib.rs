//! # qsfm-core
//!
//! **Cargo anomaly scoring from fused sensor readings, with an audit trail.**
//!
//! `qsfm-core` turns paired magnetic/gravimetric readings, optional sample
//! positions, free-text cargo manifests, and a series of signal windows into a
//! single anomaly score, merges it with a measurement from an external device,
//! and appends every decision to an append-only log.
//!
//! ## Quick Start
//!
//! ```no_run
//! use qsfm_core::{AuditTrailWriter, DemoScenario, FixedMeasurement, ScanConfig, ScanPipeline};
//!
//! let config = ScanConfig::default();
//! let audit = AuditTrailWriter::open(&config.pipeline.audit_log).unwrap();
//! let mut pipeline = ScanPipeline::new(&config, FixedMeasurement::REFERENCE, audit);
//!
//! let request = DemoScenario::default().generate(42);
//! let report = pipeline.run(&request, &qsfm_core::timestamp::now()).unwrap();
//! println!("anomaly {:.1}%, seized {:.1} kg", report.anomaly_pct, report.seized_kg);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Manifests → weights → Fusion ─┐
//! Signal windows → Entropy rate ┼→ External fuser → Audit trail
//! External device ──────────────┘
//! ```
//!
//! The audit checksum is a byte sum, not a MAC. See [`audit`] before relying
//! on it for anything beyond spotting accidental corruption.

pub mod audit;
pub mod config;
pub mod demo;
pub mod entropy_rate;
pub mod error;
pub mod external;
pub mod fusion;
pub mod manifest;
pub mod pipeline;
pub mod timestamp;

pub use audit::{
    AuditRecord, AuditSink, AuditTrailWriter, ByteSumChecksum, SharedAuditTrail, VerifySummary,
    read_log, verify_log,
};
pub use config::{EntropyConfig, ExternalConfig, FusionConfig, PipelineConfig, ScanConfig};
pub use demo::DemoScenario;
pub use entropy_rate::{EntropyRateEstimator, EntropyRateReport, SignalWindow};
pub use error::{AuditError, ConfigError, PipelineError, ScoringError};
pub use external::{
    CombinedMetrics, ExternalMeasurement, ExternalSignalFuser, FixedMeasurement,
    MeasurementProvider,
};
pub use fusion::{FusionScorer, Location};
pub use manifest::{declared_mass, extract_weights};
pub use pipeline::{ScanPipeline, ScanReport, ScanRequest};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
