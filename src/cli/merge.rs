use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::analysis::merge::{merge_tables, Suffixes};
use crate::cli::write_single_table;
use crate::parsing::tables::read_table;

#[derive(Args)]
pub struct MergeArgs {
    /// The first spreadsheet to merge
    #[arg(short = 'l', long, required = true)]
    pub left_filename: PathBuf,

    /// The second spreadsheet to merge. Defaults to the first spreadsheet
    #[arg(short = 'r', long)]
    pub right_filename: Option<PathBuf>,

    /// Sheet of the first spreadsheet to use. Defaults to the first sheet
    #[arg(short = '1', long = "left-sheetname")]
    pub left_sheet: Option<String>,

    /// Sheet of the second spreadsheet to use. Defaults to the first sheet
    #[arg(short = '2', long = "right-sheetname")]
    pub right_sheet: Option<String>,

    /// The column to merge both tables on
    #[arg(short = 'c', long, required = true)]
    pub column: String,

    /// The filename of the merged table (.xlsx, .tsv or .csv)
    #[arg(short, long, required = true)]
    pub output: PathBuf,
}

/// Execute merge-tables subcommand
///
/// # Errors
///
/// Returns an error if either table cannot be read, lacks the join column,
/// or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MergeArgs) -> anyhow::Result<()> {
    let right_filename = args
        .right_filename
        .clone()
        .unwrap_or_else(|| args.left_filename.clone());

    let left = read_table(&args.left_filename, args.left_sheet.as_deref())
        .with_context(|| format!("Failed to read {}", args.left_filename.display()))?;
    let right = read_table(&right_filename, args.right_sheet.as_deref())
        .with_context(|| format!("Failed to read {}", right_filename.display()))?;

    let file_name = |p: &PathBuf| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let suffixes = Suffixes::describe(
        &file_name(&args.left_filename),
        &file_name(&right_filename),
        args.left_sheet.as_deref().unwrap_or_default(),
        args.right_sheet.as_deref().unwrap_or_default(),
    );

    let merged = merge_tables(&left, &right, &args.column, &suffixes)
        .with_context(|| format!("Cannot merge on '{}'", args.column))?;
    info!(
        "Merged {} x {} rows into {} rows",
        left.len(),
        right.len(),
        merged.len()
    );

    write_single_table(&merged, &args.output, "merged")
}
