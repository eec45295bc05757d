//! `qsfm manifest`: show the declared mass parsed from each manifest.

use qsfm_core::extract_weights;

/// Run the manifest command.
pub fn run(manifests: &[String]) {
    for line in format_weights(manifests) {
        println!("{line}");
    }
}

fn format_weights(manifests: &[String]) -> Vec<String> {
    manifests
        .iter()
        .zip(extract_weights(manifests))
        .map(|(m, w)| format!("{w:>12.3} kg  {m}"))
        .collect()
}
