//! Benchmark configuration derived from CLI arguments

use std::path::PathBuf;

use super::cli::{BridgeMode, CliArgs};

/// Validated runtime configuration for one bridging session.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Row source location
    pub path: PathBuf,
    /// Selected bridge strategy
    pub mode: BridgeMode,
    /// Maximum stepper invocations per round; ignored by `base` mode
    pub batch_size: u64,
    /// Optional JSON report destination
    pub output_path: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
}

impl BenchmarkConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        // Validate first
        args.validate()?;

        Ok(Self {
            path: args.path.clone(),
            mode: args.mode,
            batch_size: args.batch_size,
            output_path: args.output.clone(),
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }
}
