//! `qsfm scan`: score one scan and append it to the audit trail.

use std::path::{Path, PathBuf};

use qsfm_core::{
    AuditTrailWriter, DemoScenario, FixedMeasurement, ScanConfig, ScanPipeline, ScanReport,
    ScanRequest,
};

use super::{fail, load_config};

pub struct ScanCommandConfig<'a> {
    pub input_path: Option<&'a str>,
    pub config_path: Option<&'a str>,
    pub audit_log: Option<&'a str>,
    pub seed: u64,
    pub timestamp: Option<&'a str>,
    pub location_scaling: bool,
    pub mock_device: bool,
    pub output_path: Option<&'a str>,
    pub json: bool,
}

/// Run the scan command.
pub fn run(cmd: ScanCommandConfig<'_>) {
    let config = resolve_config(&cmd).unwrap_or_else(|e| fail(e));
    let request = match cmd.input_path {
        Some(p) => read_request(Path::new(p)).unwrap_or_else(|e| fail(e)),
        None => {
            log::info!("no --input given, generating demo scan with seed {}", cmd.seed);
            DemoScenario::default().generate(cmd.seed)
        }
    };

    let provider = if cmd.mock_device {
        FixedMeasurement::REFERENCE
    } else {
        FixedMeasurement::default()
    };
    let audit_path = config.pipeline.audit_log.clone();
    let writer = AuditTrailWriter::open(&audit_path)
        .unwrap_or_else(|e| fail(format!("cannot open audit log {}: {e}", audit_path.display())));

    let mut pipeline = ScanPipeline::new(&config, provider, writer);
    let timestamp = cmd
        .timestamp
        .map_or_else(qsfm_core::timestamp::now, str::to_string);
    let report = pipeline
        .run(&request, &timestamp)
        .unwrap_or_else(|e| fail(format!("scan rejected: {e}")));
    if let Err(e) = pipeline.into_audit().close() {
        fail(format!("audit log close failed: {e}"));
    }

    if let Some(path) = cmd.output_path {
        let json = report_json(&report);
        if let Err(e) = std::fs::write(path, json) {
            fail(format!("failed to write {path}: {e}"));
        }
    }

    if cmd.json {
        println!("{}", report_json(&report));
    } else {
        print_summary(&report, &audit_path);
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cmd: &ScanCommandConfig<'_>) -> Result<ScanConfig, String> {
    let mut config = load_config(cmd.config_path)?;
    if let Some(p) = cmd.audit_log {
        config.pipeline.audit_log = PathBuf::from(p);
    }
    if cmd.location_scaling {
        config.fusion.location_scaling = true;
    }
    Ok(config)
}

fn read_request(path: &Path) -> Result<ScanRequest, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    ScanRequest::from_json(&raw).map_err(|e| format!("invalid scan request {}: {e}", path.display()))
}

fn report_json(report: &ScanReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| fail(e))
}

fn print_summary(report: &ScanReport, audit_path: &Path) {
    println!("Scan {}", report.scan_id);
    println!("  Timestamp:        {}", report.timestamp);
    println!("  Samples:          {}", report.samples);
    println!("  Fusion anomaly:   {:.6}", report.local_anomaly);
    println!("  Entropy rate:     {:.6}", report.local_entropy);
    if let Some(m) = report.manifest_mismatch_kg {
        println!("  Manifest delta:   {m:.4} kg (mean)");
    }
    println!(
        "  Fidelity:         {:.3}{}",
        report.fidelity,
        if report.low_fidelity { "  (low, penalized)" } else { "" }
    );
    println!(
        "  Device:           anomaly {} entropy {} tag {}",
        report.external.anomaly_raw,
        report.external.entropy_raw,
        report.integrity_tag_hex()
    );
    println!();
    println!("  Integrated anomaly: {:.1}%", report.anomaly_pct);
    println!("  Integrated entropy: {:.4}", report.combined_entropy);
    println!("  Seized estimate:    {:.1} kg", report.seized_kg);
    println!();
    println!(
        "Audit record appended to {} (checksum {}, byte sum, not tamper-proof)",
        audit_path.display(),
        report.checksum
    );
}
