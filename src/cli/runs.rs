use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::analysis::runs::{concatenate, pair_runs};
use crate::utils::validation::validate_input_directory;

#[derive(Args)]
pub struct CombineRunsArgs {
    /// First run folder; its layout is mirrored in the output
    #[arg(required = true)]
    pub first: PathBuf,

    /// Second run folder
    #[arg(required = true)]
    pub second: PathBuf,

    /// Output folder for the combined files
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Print the planned concatenations without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute combine-runs subcommand
///
/// # Errors
///
/// Returns an error if a run folder is invalid, files do not pair up, or a
/// combined file cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CombineRunsArgs) -> anyhow::Result<()> {
    validate_input_directory(&args.first)?;
    validate_input_directory(&args.second)?;

    let pairs = pair_runs(&args.first, &args.second, &args.output)?;
    info!("Found {} files", pairs.len());

    for pair in &pairs {
        if args.dry_run {
            println!(
                "cat {} {} > {}",
                pair.first.display(),
                pair.second.display(),
                pair.output.display()
            );
            continue;
        }
        concatenate(pair).with_context(|| format!("Failed to write {}", pair.output.display()))?;
        info!("Combined {}", pair.output.display());
    }
    Ok(())
}
