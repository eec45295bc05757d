//! Append-only audit trail of scoring decisions.
//!
//! One record per line:
//!
//! ```text
//! <timestamp>,<anomaly>,<entropy>,<seized>,<checksum>
//! ```
//!
//! Scores are written with six decimals. The checksum is the byte sum of
//! everything before the final comma, modulo `2^32 - 1`.
//!
//! **The checksum is NOT cryptographic.** It is an additive integrity hint
//! that catches accidental corruption such as truncated writes or bit flips.
//! Anyone can forge it, and reordering the bytes of a line leaves it
//! unchanged. Do not treat a verified log as tamper-proof.
//!
//! The writer opens the file once in append mode, writes each record with a
//! single call, and flushes and syncs it before returning. Nothing is ever
//! rewritten or truncated.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// Modulus of the byte-sum checksum: `2^32 - 1`.
pub const CHECKSUM_MODULUS: u64 = 0xFFFF_FFFF;

/// Additive byte-sum checksum. Non-cryptographic; see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteSumChecksum(pub u32);

impl ByteSumChecksum {
    pub fn of(data: &[u8]) -> Self {
        let sum: u64 = data.iter().map(|&b| u64::from(b)).sum();
        // The remainder is always below 2^32 - 1.
        Self((sum % CHECKSUM_MODULUS) as u32)
    }
}

impl std::fmt::Display for ByteSumChecksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scoring decision as stored in the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub anomaly_score: f64,
    pub entropy_score: f64,
    pub seized_mass_estimate: f64,
    pub checksum: ByteSumChecksum,
}

impl AuditRecord {
    /// Build a record, rejecting timestamps that would break the line format.
    pub fn new(
        timestamp: &str,
        anomaly: f64,
        entropy: f64,
        seized_estimate: f64,
    ) -> Result<Self, AuditError> {
        if timestamp.contains([',', '\n', '\r']) {
            return Err(AuditError::MalformedField {
                field: "timestamp",
                value: timestamp.to_string(),
            });
        }
        let body = record_body(timestamp, anomaly, entropy, seized_estimate);
        Ok(Self {
            timestamp: timestamp.to_string(),
            anomaly_score: anomaly,
            entropy_score: entropy,
            seized_mass_estimate: seized_estimate,
            checksum: ByteSumChecksum::of(body.as_bytes()),
        })
    }

    /// The comma-joined fields covered by the checksum.
    pub fn body(&self) -> String {
        record_body(
            &self.timestamp,
            self.anomaly_score,
            self.entropy_score,
            self.seized_mass_estimate,
        )
    }

    /// Full line as written to disk, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{},{}", self.body(), self.checksum)
    }

    /// Parse and checksum-verify one log line. `line_no` is 1-based.
    pub fn parse_line(line_no: usize, line: &str) -> Result<Self, AuditError> {
        let malformed = |reason: &str| AuditError::MalformedLine {
            line: line_no,
            reason: reason.to_string(),
        };

        let (body, stored) = line.rsplit_once(',').ok_or_else(|| malformed("no fields"))?;
        let computed = ByteSumChecksum::of(body.as_bytes());
        if stored != computed.to_string() {
            return Err(AuditError::ChecksumMismatch {
                line: line_no,
                expected: computed.to_string(),
                got: stored.to_string(),
            });
        }

        let fields: Vec<&str> = body.split(',').collect();
        let [timestamp, anomaly, entropy, seized] = fields[..] else {
            return Err(malformed("expected 5 fields"));
        };
        let number = |s: &str, name: &str| {
            s.parse::<f64>()
                .map_err(|_| malformed(&format!("{name} is not a number: {s:?}")))
        };

        Ok(Self {
            timestamp: timestamp.to_string(),
            anomaly_score: number(anomaly, "anomaly")?,
            entropy_score: number(entropy, "entropy")?,
            seized_mass_estimate: number(seized, "seized")?,
            checksum: computed,
        })
    }
}

fn record_body(timestamp: &str, anomaly: f64, entropy: f64, seized: f64) -> String {
    format!("{timestamp},{anomaly:.6},{entropy:.6},{seized:.6}")
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Anything that can durably append an audit record.
pub trait AuditSink {
    fn append(
        &mut self,
        timestamp: &str,
        anomaly: f64,
        entropy: f64,
        seized_estimate: f64,
    ) -> Result<AuditRecord, AuditError>;
}

/// Exclusive owner of the audit log append cursor.
///
/// The file is opened on construction and flushed on drop.
pub struct AuditTrailWriter {
    path: PathBuf,
    file: File,
    records_written: u64,
}

impl AuditTrailWriter {
    /// Open (or create) the log in append mode, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::info!("audit trail opened at {}", path.display());

        Ok(Self {
            path,
            file,
            records_written: 0,
        })
    }

    /// Append one record and force it to storage before returning.
    pub fn append(
        &mut self,
        timestamp: &str,
        anomaly: f64,
        entropy: f64,
        seized_estimate: f64,
    ) -> Result<AuditRecord, AuditError> {
        let record = AuditRecord::new(timestamp, anomaly, entropy, seized_estimate)?;
        let mut line = record.to_line();
        line.push('\n');

        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.file.sync_data()?;

        self.records_written += 1;
        log::debug!(
            "audit record {} appended to {} (checksum {})",
            self.records_written,
            self.path.display(),
            record.checksum
        );
        Ok(record)
    }

    /// Flush and sync, surfacing any error that `Drop` would swallow.
    pub fn close(mut self) -> Result<(), AuditError> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this writer (not the total in the file).
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Share this writer between scorers; appends are serialized by a lock.
    pub fn into_shared(self) -> SharedAuditTrail {
        SharedAuditTrail {
            inner: Arc::new(Mutex::new(self)),
        }
    }
}

impl AuditSink for AuditTrailWriter {
    fn append(
        &mut self,
        timestamp: &str,
        anomaly: f64,
        entropy: f64,
        seized_estimate: f64,
    ) -> Result<AuditRecord, AuditError> {
        AuditTrailWriter::append(self, timestamp, anomaly, entropy, seized_estimate)
    }
}

impl Drop for AuditTrailWriter {
    fn drop(&mut self) {
        if let Err(e) = self.file.flush() {
            log::error!("audit trail flush on close failed for {}: {e}", self.path.display());
        }
    }
}

/// Cloneable handle to one [`AuditTrailWriter`] for concurrent scorers.
#[derive(Clone)]
pub struct SharedAuditTrail {
    inner: Arc<Mutex<AuditTrailWriter>>,
}

impl SharedAuditTrail {
    pub fn append(
        &self,
        timestamp: &str,
        anomaly: f64,
        entropy: f64,
        seized_estimate: f64,
    ) -> Result<AuditRecord, AuditError> {
        // A panic mid-append cannot leave a partial record: each line is one write.
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        writer.append(timestamp, anomaly, entropy, seized_estimate)
    }

    pub fn records_written(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records_written()
    }
}

impl AuditSink for SharedAuditTrail {
    fn append(
        &mut self,
        timestamp: &str,
        anomaly: f64,
        entropy: f64,
        seized_estimate: f64,
    ) -> Result<AuditRecord, AuditError> {
        SharedAuditTrail::append(self, timestamp, anomaly, entropy, seized_estimate)
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Result of a successful [`verify_log`] pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifySummary {
    pub records: usize,
    pub last_timestamp: Option<String>,
}

/// Read every record, recomputing each checksum. Stops at the first bad line.
///
/// A missing file is an empty log. Blank lines are skipped.
pub fn verify_log(path: impl AsRef<Path>) -> Result<VerifySummary, AuditError> {
    let mut summary = VerifySummary::default();
    for record in read_log(path)? {
        summary.records += 1;
        summary.last_timestamp = Some(record.timestamp);
    }
    Ok(summary)
}

/// Parse and verify all records in file order.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<AuditRecord>, AuditError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let rdr = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (i, line) in rdr.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => AuditError::MalformedLine {
                line: i + 1,
                reason: e.to_string(),
            },
            _ => AuditError::Io(e),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(AuditRecord::parse_line(i + 1, &line)?);
    }
    Ok(records)
}
