//! stepper-bridge-benchmark - synchronization overhead benchmark
//!
//! Drives a blocking row iterator to exhaustion in bounded batches using
//! one of four worker/controller bridge strategies and reports how much
//! the synchronization itself costs.

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use stepper_bridge_benchmark::bridge::run_mode;
use stepper_bridge_benchmark::config::{BenchmarkConfig, CliArgs};

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn print_banner(config: &BenchmarkConfig) {
    if config.quiet {
        return;
    }

    println!("stepper-bridge-benchmark v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================");
    println!("Source: {}", config.path.display());
    println!(
        "Mode: {}, Batch size: {}",
        config.mode.as_str(),
        config.batch_size
    );
    println!("====================================\n");
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    // Build configuration
    let config = BenchmarkConfig::from_cli(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    print_banner(&config);

    // One bounded run-to-completion bridging session.
    let report = run_mode(&config)?;

    if let Some(ref output_path) = config.output_path {
        info!("Writing report to: {}", output_path.display());
        report.export_json(output_path)?;
    }

    if !config.quiet {
        report.print_summary();
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
