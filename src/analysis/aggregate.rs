//! Aggregation of breseq reports across sample folders.
//!
//! The input directory holds one sub-folder per sample, each with the breseq
//! report at `output/index.html`. Folders are visited in name order; files at
//! the top level and folders without a report are skipped.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::analysis::comparison::{compare_samples, Comparison, ComparisonError};
use crate::core::table::Table;
use crate::parsing::breseq::{parse_report_file, ReportError, SampleReport};

/// Location of the report inside a sample folder
pub const REPORT_RELATIVE_PATH: &str = "output/index.html";

/// Aggregated tables across all samples
#[derive(Debug, Clone, Default)]
pub struct BreseqCollection {
    /// Samples that contributed a report, in visit order
    pub samples: Vec<String>,
    /// Sample folders without a report
    pub skipped: Vec<PathBuf>,
    pub mutations: Table,
    pub coverage: Table,
    pub junctions: Table,
}

impl BreseqCollection {
    /// Parse every sample folder under `directory`
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if the directory or a report cannot be read,
    /// or `ReportError::Schema` if a report has an unusable table header.
    pub fn collect(directory: &Path) -> Result<Self, ReportError> {
        let mut folders: Vec<PathBuf> = std::fs::read_dir(directory)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        folders.sort();

        let mut collection = Self::default();
        for folder in folders {
            info!("Parsing {}", folder.display());
            match parse_output_folder(&folder)? {
                Some(report) => collection.add(report),
                None => collection.skipped.push(folder),
            }
        }

        info!(
            "Collected {} samples ({} skipped): {} mutations, {} coverage rows, {} junction rows",
            collection.samples.len(),
            collection.skipped.len(),
            collection.mutations.len(),
            collection.coverage.len(),
            collection.junctions.len()
        );
        Ok(collection)
    }

    /// Add one sample's rows to the aggregate tables
    pub fn add(&mut self, report: SampleReport) {
        self.mutations.extend_rows(report.mutations);
        self.coverage.extend_rows(report.coverage);
        self.junctions.extend_rows(report.junctions);
        self.samples.push(report.sample);
    }

    /// Build the sample-vs-position comparison matrix from the mutation table
    ///
    /// # Errors
    ///
    /// Returns `ComparisonError` if the mutation table lacks an expected column.
    pub fn comparison(&self) -> Result<Comparison, ComparisonError> {
        compare_samples(&self.mutations)
    }
}

/// Parse the report of one sample folder
///
/// The folder name is the sample name. Returns `Ok(None)` when the folder has
/// no report.
///
/// # Errors
///
/// Returns `ReportError` if the report exists but cannot be read or parsed.
pub fn parse_output_folder(folder: &Path) -> Result<Option<SampleReport>, ReportError> {
    let index_file = folder.join(REPORT_RELATIVE_PATH);
    if !index_file.is_file() {
        warn!(
            "{} is missing, skipping folder {}",
            REPORT_RELATIVE_PATH,
            folder.display()
        );
        return Ok(None);
    }

    let sample = folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_report_file(&sample, &index_file).map(Some)
}
