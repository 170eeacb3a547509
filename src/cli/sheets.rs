use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::analysis::billing::{build_billing, collect_sample_files, write_billing};
use crate::core::config::ColumnMap;
use crate::output::delimited::write_delimited;
use crate::parsing::samplesheet::{combine_sample_sheets, find_sample_sheets};
use crate::utils::validation::validate_input_directory;

#[derive(Args)]
pub struct SampleSheetsArgs {
    /// Extra folders to search for SampleSheet.csv files
    pub folders: Vec<PathBuf>,

    /// Demultiplexed run folder holding one folder of FASTQ files per sample
    #[arg(short, long, required = true)]
    pub dmux_dir: PathBuf,

    /// Folder for the combined sample sheet and billing workbook
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// JSON map of SampleSheet column names to output column names
    #[arg(long)]
    pub column_map: Option<PathBuf>,
}

/// Execute sample-sheets subcommand
///
/// # Errors
///
/// Returns an error if a folder is invalid, the column map cannot be loaded,
/// or an output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SampleSheetsArgs) -> anyhow::Result<()> {
    let columns = match &args.column_map {
        Some(path) => ColumnMap::load_from_file(path)
            .with_context(|| format!("Failed to load column map {}", path.display()))?,
        None => ColumnMap::default(),
    };

    let mut sheets = Vec::new();
    for folder in args.folders.iter().chain(std::iter::once(&args.dmux_dir)) {
        validate_input_directory(folder)?;
        let found = find_sample_sheets(folder)?;
        info!("Found {} sample sheets in {}", found.len(), folder.display());
        sheets.extend(found);
    }

    let sheet = combine_sample_sheets(&sheets, &columns);
    let sample_files = collect_sample_files(&args.dmux_dir)?;
    let report = build_billing(&sheet, &sample_files);

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d");

    let combined_path = args
        .output_dir
        .join(format!("combined_sample_sheet.{today}.tsv"));
    write_delimited(&sheet, &combined_path, b'\t')
        .with_context(|| format!("Failed to write {}", combined_path.display()))?;
    info!("Wrote {}", combined_path.display());

    let billing_path = args.output_dir.join(format!("billing.{today}.xlsx"));
    write_billing(&sheet, &report, &billing_path)
        .with_context(|| format!("Failed to write {}", billing_path.display()))?;
    info!("Wrote {}", billing_path.display());
    Ok(())
}
