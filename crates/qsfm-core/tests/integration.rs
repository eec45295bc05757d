//! Integration tests for qsfm-core.
//!
//! These tests drive the full scoring path:
//! manifests and sensor arrays → fusion → entropy rate → external fuser →
//! audit trail → verification.

use qsfm_core::{
    AuditTrailWriter, DemoScenario, EntropyRateEstimator, ExternalMeasurement, FixedMeasurement,
    FusionScorer, ScanConfig, ScanPipeline, ScanRequest, extract_weights, read_log, verify_log,
};

#[test]
fn reference_manifest_scan_scores_per_sample_mismatch() {
    let mag = vec![1e-9; 100];
    let grav = vec![5e-5; 100];
    let manifests = vec!["cargo: electronics 50kg"; 100];
    let weights = extract_weights(&manifests);
    assert!(weights.iter().all(|&w| w == 50.0));

    let score = FusionScorer::default()
        .fuse(&mag, &grav, None, Some(&weights))
        .unwrap();
    assert!(
        (score - 45.00005).abs() < 1e-6,
        "unexpected fused score {score}"
    );

    // Deterministic: no hidden randomness in the scorer.
    let again = FusionScorer::default()
        .fuse(&mag, &grav, None, Some(&weights))
        .unwrap();
    assert_eq!(score, again);
}

#[test]
fn constant_comms_windows_have_no_entropy_rate() {
    let comms = vec![vec![0.5; 5]; 10];
    assert_eq!(EntropyRateEstimator::default().estimate(&comms).unwrap(), 0.0);
}

#[test]
fn demo_scan_is_reproducible_and_audited() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("qsfm_audits.txt");
    let config = ScanConfig::default();

    let writer = AuditTrailWriter::open(&path).unwrap();
    let mut pipeline = ScanPipeline::new(&config, FixedMeasurement::REFERENCE, writer);

    let demo = DemoScenario::default();
    let a = pipeline.run(&demo.generate(42), "2025-08-07 12:00:00").unwrap();
    let b = pipeline.run(&demo.generate(42), "2025-08-07 12:00:00").unwrap();
    assert_eq!(a.combined_anomaly, b.combined_anomaly);
    assert_eq!(a.checksum, b.checksum);
    assert_ne!(a.scan_id, b.scan_id);
    pipeline.into_audit().close().unwrap();

    let records = read_log(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp, "2025-08-07 12:00:00");
    assert!((records[0].anomaly_score - a.combined_anomaly).abs() < 1e-6);
    assert!((records[0].seized_mass_estimate - a.seized_kg).abs() < 1e-6);
}

#[test]
fn audit_lines_are_independently_verifiable() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("audit.txt");
    let mut writer = AuditTrailWriter::open(&path).unwrap();
    for i in 0..10 {
        writer
            .append(&format!("2025-01-01 00:00:{i:02}"), i as f64 * 0.1, 1.0, 8.0)
            .unwrap();
    }
    writer.close().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 10);
    for (i, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], format!("2025-01-01 00:00:{i:02}"));
        let body = fields[..4].join(",");
        let sum: u64 = body.bytes().map(u64::from).sum::<u64>() % 0xFFFF_FFFF;
        assert_eq!(fields[4], sum.to_string());
    }
    assert_eq!(verify_log(&path).unwrap().records, 10);
}

#[test]
fn rejected_scan_leaves_log_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("audit.txt");
    let writer = AuditTrailWriter::open(&path).unwrap();
    let mut pipeline = ScanPipeline::new(&ScanConfig::default(), FixedMeasurement::default(), writer);

    let request = ScanRequest {
        mag: vec![1.0, 2.0, 3.0],
        grav: vec![1.0, 2.0],
        ..ScanRequest::default()
    };
    assert!(pipeline.run(&request, "t").is_err());

    let empty = ScanRequest::default();
    assert!(pipeline.run(&empty, "t").is_err());
    drop(pipeline);

    assert_eq!(verify_log(&path).unwrap().records, 0);
}

#[test]
fn json_request_round_trips_through_pipeline() {
    let raw = r#"{
        "mag": [0.0, 1.0],
        "grav": [0.0, 0.0],
        "manifests": ["box 0kg", "crate 0kg"],
        "signals": [[0.5, 0.5], [0.5, 0.5]],
        "external": {"anomaly_raw": 50, "entropy_raw": 3, "integrity_tag": 1}
    }"#;
    let request = ScanRequest::from_json(raw).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let writer = AuditTrailWriter::open(tmp.path().join("audit.txt")).unwrap();
    let mut pipeline = ScanPipeline::new(&ScanConfig::default(), FixedMeasurement::REFERENCE, writer);
    let report = pipeline.run(&request, "t").unwrap();

    assert!((report.local_anomaly - 0.5).abs() < 1e-12);
    assert!((report.combined_anomaly - 1.0).abs() < 1e-12);
    assert_eq!(report.combined_entropy, 3.0);
    assert_eq!(
        report.external,
        ExternalMeasurement {
            anomaly_raw: 50,
            entropy_raw: 3,
            integrity_tag: 1
        }
    );
}
