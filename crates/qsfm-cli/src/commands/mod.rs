pub mod manifest;
pub mod scan;
pub mod verify;

use std::path::Path;

use qsfm_core::ScanConfig;

/// Install the stderr logger. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

/// Load a config file, or the defaults when no path is given.
pub fn load_config(path: Option<&str>) -> Result<ScanConfig, String> {
    match path {
        Some(p) => ScanConfig::load_from_path(Path::new(p))
            .map_err(|e| format!("failed to load config '{p}': {e}")),
        None => Ok(ScanConfig::default()),
    }
}

/// Print an error and exit with status 1.
pub fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}
