//! `qsfm verify`: recompute audit record checksums.

use std::path::Path;

use qsfm_core::verify_log;

use super::fail;

/// Run the verify command.
pub fn run(path: &str) {
    let path = Path::new(path);
    if !path.exists() {
        fail(format!("audit log {} does not exist", path.display()));
    }

    match verify_log(path) {
        Ok(summary) => {
            println!("{}: {} records, all checksums match", path.display(), summary.records);
            if let Some(ts) = summary.last_timestamp {
                println!("  Last record: {ts}");
            }
            println!("  Note: byte-sum checksums detect accidental corruption only, not tampering.");
        }
        Err(e) => fail(format!("{}: {e}", path.display())),
    }
}
