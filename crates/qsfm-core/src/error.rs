//! Error taxonomy for scoring, audit logging, and configuration.
//!
//! Validation failures are raised before any score is produced, and never
//! after the audit trail has been touched. A low-fidelity entropy window is
//! not an error; see [`crate::entropy_rate`].

/// Errors raised while computing a score.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScoringError {
    /// Paired inputs disagree on length, or a signal series has ragged windows.
    #[error("shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// Primary input is empty where a mean is required.
    #[error("empty input: {what}")]
    EmptyInput { what: &'static str },
    /// External measurement exceeds a configured sanity bound.
    #[error("external {field} out of range: {value} exceeds limit {limit}")]
    ExternalOutOfRange {
        field: &'static str,
        value: f64,
        limit: f64,
    },
}

/// Errors raised by the audit trail writer and verifier.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// A field would corrupt the comma/newline delimited record format.
    #[error("malformed {field}: {value:?} contains a record delimiter")]
    MalformedField { field: &'static str, value: String },
    #[error("malformed record at line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
    #[error("checksum mismatch at line {line}: expected {expected}, got {got}")]
    ChecksumMismatch {
        line: usize,
        expected: String,
        got: String,
    },
}

/// Errors raised while loading or validating a [`crate::config::ScanConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Umbrella error for one end-to-end scan.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
