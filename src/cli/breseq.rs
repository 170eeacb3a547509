use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::analysis::aggregate::BreseqCollection;
use crate::analysis::comparison::{Comparison, UNIQUE_MARK};
use crate::cli::TableFormat;
use crate::output::delimited::write_delimited;
use crate::output::workbook::WorkbookWriter;
use crate::parsing::breseq::{junction_side_a_only_columns, SAMPLE_COLUMN};
use crate::utils::validation::{resolve_output_base, suffixed_path, validate_input_directory};

/// File name used when `--output` points at a directory
pub const DEFAULT_OUTPUT_NAME: &str = "breseq_output";

pub const SNP_SHEET: &str = "snps";
pub const COVERAGE_SHEET: &str = "coverage";
pub const JUNCTION_SHEET: &str = "junctions";
pub const COMPARISON_SHEET: &str = "snp comparison";

#[derive(Args)]
pub struct BreseqArgs {
    /// Folder containing one breseq output folder per sample
    #[arg(short, long, required = true)]
    pub directory: PathBuf,

    /// Format of the output file(s)
    #[arg(short, long, value_enum, default_value = "xlsx")]
    pub format: TableFormat,

    /// Name of the output file(s) or folder
    #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
    pub output: PathBuf,
}

/// Execute breseq subcommand
///
/// # Errors
///
/// Returns an error if the input directory is invalid, a report cannot be
/// parsed, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: BreseqArgs, verbose: bool) -> anyhow::Result<()> {
    validate_input_directory(&args.directory).context(
        "Please enter a valid directory to parse, try the --help flag if you have questions",
    )?;

    let collection = BreseqCollection::collect(&args.directory)
        .with_context(|| format!("Failed to parse reports in {}", args.directory.display()))?;

    if verbose && !collection.skipped.is_empty() {
        let skipped: Vec<String> = collection
            .skipped
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        info!("Folders without a report: {}", skipped.join(", "));
    }

    let base = resolve_output_base(&args.output, DEFAULT_OUTPUT_NAME);
    info!("Saving to {}", base.display());

    match args.format {
        TableFormat::Xlsx => save_workbook(&collection, &base.with_extension("xlsx")),
        format => save_delimited(&collection, &base, format),
    }
}

/// Write all tables into one workbook
///
/// # Errors
///
/// Returns an error if a sheet or the file cannot be written. A mutation
/// table that cannot be compared only drops the `snp comparison` sheet.
pub fn save_workbook(collection: &BreseqCollection, path: &Path) -> anyhow::Result<()> {
    let merge_columns: Vec<&str> = std::iter::once(SAMPLE_COLUMN)
        .chain(junction_side_a_only_columns().iter().copied())
        .collect();

    let mut writer = WorkbookWriter::new();
    writer.add_table(SNP_SHEET, &collection.mutations)?;
    writer.add_table(COVERAGE_SHEET, &collection.coverage)?;
    writer.add_paired_table(JUNCTION_SHEET, &collection.junctions, &merge_columns)?;
    match collection.comparison() {
        Ok(Comparison::Matrix(matrix)) => {
            writer.add_highlighted_table(COMPARISON_SHEET, &matrix, UNIQUE_MARK)?;
        }
        Ok(Comparison::NoData) => warn!("No mutations found, omitting the snp comparison sheet"),
        Err(e) => warn!("Omitting the snp comparison sheet: {e}"),
    }

    writer
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Write the mutation, coverage and junction tables as `<base>.snp.<ext>`,
/// `<base>.coverage.<ext>` and `<base>.junction.<ext>`
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn save_delimited(
    collection: &BreseqCollection,
    base: &Path,
    format: TableFormat,
) -> anyhow::Result<()> {
    let tables = [
        ("snp", &collection.mutations),
        ("coverage", &collection.coverage),
        ("junction", &collection.junctions),
    ];
    for (kind, table) in tables {
        let path = suffixed_path(base, kind, format.extension())?;
        write_delimited(table, &path, format.delimiter())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {} rows to {}", table.len(), path.display());
    }
    Ok(())
}
