use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::parsing::fasta::{filter_contigs_file, DEFAULT_CUTOFF};
use crate::utils::validation::validate_input_file;

#[derive(Args)]
pub struct FilterContigsArgs {
    /// Input FASTA file (plain or gzip compressed)
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Output FASTA file
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Keep contigs longer than this many bases
    #[arg(long, default_value_t = DEFAULT_CUTOFF)]
    pub cutoff: usize,
}

/// Execute filter-contigs subcommand
///
/// # Errors
///
/// Returns an error if the input cannot be parsed or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: FilterContigsArgs) -> anyhow::Result<()> {
    validate_input_file(&args.input)?;

    let stats = filter_contigs_file(&args.input, &args.output, args.cutoff)
        .with_context(|| format!("Failed to filter {}", args.input.display()))?;
    info!(
        "Kept {} of {} contigs longer than {} bp",
        stats.kept,
        stats.total(),
        args.cutoff
    );
    Ok(())
}
