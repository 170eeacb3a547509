//! Command-line interface for bactools.
//!
//! Each subcommand is one step of the bacterial genomics workflow:
//!
//! - **breseq**: Combine breseq mutation reports from many samples
//! - **merge-tables**: Join two spreadsheets on a shared column
//! - **annotate-tree**: Relabel tree leaves from an annotation table
//! - **combine-runs**: Concatenate FASTQ files split across two sequencer runs
//! - **filter-contigs**: Drop short FASTA contigs
//! - **sample-sheets**: Combine SampleSheet.csv files into a billing report
//!
//! ## Usage
//!
//! ```text
//! # One workbook with snps, coverage, junctions and snp comparison sheets
//! bactools breseq -d breseq_runs/ -o results/breseq_output
//!
//! # Three TSV files instead
//! bactools breseq -d breseq_runs/ -f tsv
//!
//! # Keep contigs longer than 500 bp
//! bactools filter-contigs -i assembly.fasta -o filtered.fasta --cutoff 500
//! ```

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

pub mod annotate;
pub mod breseq;
pub mod contigs;
pub mod merge;
pub mod runs;
pub mod sheets;

#[derive(Parser)]
#[command(name = "bactools")]
#[command(version)]
#[command(about = "Bacterial genomics workflow tools")]
#[command(
    long_about = "bactools bundles the small steps of a bacterial genomics workflow:\n\n- Parsing breseq mutation reports into combined tables\n- Merging and annotating spreadsheets and phylogenetic trees\n- Combining sequencer runs, filtering contigs and building billing reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse breseq output folders into combined mutation tables
    Breseq(breseq::BreseqArgs),

    /// Merge two tables on a shared column
    MergeTables(merge::MergeArgs),

    /// Replace sample ids in a tree file with annotation labels
    AnnotateTree(annotate::AnnotateArgs),

    /// Concatenate matching FASTQ files from two sequencer runs
    CombineRuns(runs::CombineRunsArgs),

    /// Remove FASTA contigs at or below a length cutoff
    FilterContigs(contigs::FilterContigsArgs),

    /// Combine SampleSheet.csv files into a billing workbook
    SampleSheets(sheets::SampleSheetsArgs),
}

/// Tabular output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TableFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl TableFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Xlsx => "xlsx",
        }
    }

    /// Field delimiter for the text formats
    #[must_use]
    pub fn delimiter(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            Self::Csv | Self::Xlsx => b',',
        }
    }

    /// Format implied by a file extension, CSV when unknown
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("xlsx") => Self::Xlsx,
            Some("tsv" | "tab") => Self::Tsv,
            _ => Self::Csv,
        }
    }
}

/// Write a single table in the format implied by `path`; workbooks get one
/// sheet called `sheet`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub(crate) fn write_single_table(
    table: &crate::core::table::Table,
    path: &Path,
    sheet: &str,
) -> anyhow::Result<()> {
    let result = match TableFormat::from_path(path) {
        TableFormat::Xlsx => {
            let mut writer = crate::output::workbook::WorkbookWriter::new();
            writer
                .add_table(sheet, table)
                .and_then(|()| writer.save(path))
        }
        format => crate::output::delimited::write_delimited(table, path, format.delimiter()),
    };
    result.with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_format_from_path() {
        assert_eq!(TableFormat::from_path(Path::new("a.xlsx")), TableFormat::Xlsx);
        assert_eq!(TableFormat::from_path(Path::new("a.TSV")), TableFormat::Tsv);
        assert_eq!(TableFormat::from_path(Path::new("a.csv")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("a")), TableFormat::Csv);
    }

    #[test]
    fn test_cli_parses_breseq_defaults() {
        let cli = Cli::try_parse_from(["bactools", "breseq", "-d", "runs"]).unwrap();
        match cli.command {
            Commands::Breseq(args) => {
                assert_eq!(args.format, TableFormat::Xlsx);
                assert_eq!(args.output, std::path::PathBuf::from("breseq_output"));
            }
            _ => panic!("expected breseq subcommand"),
        }
    }
}
