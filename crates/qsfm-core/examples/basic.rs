//! Basic scan example.
//!
//! Generates the seeded demo scan, scores it against the reference external
//! measurement, and appends the decision to `qsfm_audits.txt`.
//!
//! Run: `cargo run --example basic`

use qsfm_core::{AuditTrailWriter, DemoScenario, FixedMeasurement, ScanConfig, ScanPipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ScanConfig::default();
    let audit = AuditTrailWriter::open(&config.pipeline.audit_log)?;
    let mut pipeline = ScanPipeline::new(&config, FixedMeasurement::REFERENCE, audit);

    let request = DemoScenario::default().generate(42);
    let report = pipeline.run(&request, &qsfm_core::timestamp::now())?;

    println!("Integrated anomaly: {:.1}%", report.anomaly_pct);
    println!("Entropy:            {:.4}", report.combined_entropy);
    println!("Seized estimate:    {:.1} kg", report.seized_kg);
    println!("Audit checksum:     {} (byte sum, not a signature)", report.checksum);
    Ok(())
}
