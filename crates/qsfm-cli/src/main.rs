//! CLI for qsfm: score cargo scans and keep an audit trail of every decision.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qsfm")]
#[command(about = "qsfm: fused sensor anomaly scoring with an append-only audit trail")]
#[command(version = qsfm_core::VERSION)]
struct Cli {
    /// Log debug diagnostics to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one scan and append the decision to the audit log.
    /// Without --input, a seeded demo scan is generated.
    Scan {
        /// JSON scan request (mag, grav, locations, manifests, signals, external)
        #[arg(long)]
        input: Option<String>,

        /// JSON config file; missing fields use defaults
        #[arg(long)]
        config: Option<String>,

        /// Audit log path (overrides the config file)
        #[arg(long)]
        audit_log: Option<String>,

        /// Seed for the demo scan's magnetic noise
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Audit timestamp; default is the current UTC time
        #[arg(long)]
        timestamp: Option<String>,

        /// Fold location-scaled deltas into the fusion score
        #[arg(long)]
        location_scaling: bool,

        /// Use the reference mock device measurement (140, 450000, 0xABCDEF01)
        /// when the request carries none
        #[arg(long)]
        mock_device: bool,

        /// Write the scan report as JSON to this path
        #[arg(long)]
        output: Option<String>,

        /// Print the scan report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Recompute every audit record checksum (byte sums, not signatures)
    Verify {
        /// Audit log path
        #[arg(default_value = qsfm_core::config::DEFAULT_AUDIT_LOG)]
        path: String,
    },

    /// Print the declared mass extracted from each manifest
    Manifest {
        /// Manifest texts, e.g. "cargo: electronics 50kg"
        #[arg(required = true)]
        manifests: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            input,
            config,
            audit_log,
            seed,
            timestamp,
            location_scaling,
            mock_device,
            output,
            json,
        } => commands::scan::run(commands::scan::ScanCommandConfig {
            input_path: input.as_deref(),
            config_path: config.as_deref(),
            audit_log: audit_log.as_deref(),
            seed,
            timestamp: timestamp.as_deref(),
            location_scaling,
            mock_device,
            output_path: output.as_deref(),
            json,
        }),
        Commands::Verify { path } => commands::verify::run(&path),
        Commands::Manifest { manifests } => commands::manifest::run(&manifests),
    }
}
