//! Billing report: which samples of each project have sequencing files.
//!
//! Demultiplexed FASTQ files live in one folder per sample id, below run
//! folders named after the run date (`DDMMYY`). Samples from the combined
//! sample sheet are grouped by project and matched to those folders.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::analysis::runs::{find_gz_files, RunsError};
use crate::core::table::{Row, Table};
use crate::output::workbook::WorkbookWriter;
use crate::parsing::tables::TableError;

pub const PROJECT_COLUMN: &str = "projectName";
pub const SAMPLE_ID_COLUMN: &str = "sampleId";
pub const SAMPLE_NAME_COLUMN: &str = "sampleName";

const PROJECT_COLUMNS: [&str; 4] = [
    PROJECT_COLUMN,
    "expectedSamples",
    "foundSamples",
    "missingSamples",
];
const SAMPLE_COLUMNS: [&str; 4] = [SAMPLE_ID_COLUMN, SAMPLE_NAME_COLUMN, PROJECT_COLUMN, "files"];
const FILE_COLUMNS: [&str; 5] = [
    "sampleDate",
    SAMPLE_ID_COLUMN,
    PROJECT_COLUMN,
    SAMPLE_NAME_COLUMN,
    "filename",
];

/// Per-project, per-sample and per-file tables
#[derive(Debug, Clone, Default)]
pub struct BillingReport {
    pub projects: Table,
    pub samples: Table,
    pub files: Table,
}

/// Group every `*.gz` file below `dmux` by its parent folder name
///
/// # Errors
///
/// Returns `RunsError::Walk` if the folder cannot be traversed.
pub fn collect_sample_files(dmux: &Path) -> Result<BTreeMap<String, Vec<PathBuf>>, RunsError> {
    let mut sample_files: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in find_gz_files(dmux)? {
        let sample_id = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        sample_files.entry(sample_id).or_default().push(path);
    }
    info!(
        "Found files for {} samples in {}",
        sample_files.len(),
        dmux.display()
    );
    Ok(sample_files)
}

/// Date of the nearest all-digit path component, read as `DDMMYY`
///
/// # Examples
///
/// ```
/// use bactools::analysis::billing::date_from_path;
/// use chrono::NaiveDate;
/// use std::path::Path;
///
/// let path = Path::new("dmux/181018/Cystic/AU1234/AU1234_R1.fastq.gz");
/// assert_eq!(date_from_path(path), NaiveDate::from_ymd_opt(2018, 10, 18));
/// ```
#[must_use]
pub fn date_from_path(path: &Path) -> Option<NaiveDate> {
    let part = path
        .iter()
        .rev()
        .filter_map(|p| p.to_str())
        .find(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))?;
    if part.len() < 5 {
        return None;
    }
    let day = part.get(..2)?.parse().ok()?;
    let month = part.get(2..part.len() - 2)?.parse().ok()?;
    let year: i32 = part.get(part.len() - 2..)?.parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Match the samples of `sheet` to their files, project by project
///
/// Projects are sorted by name; rows without a project are ignored. A sample
/// counts as found when at least one file exists for its id.
#[must_use]
pub fn build_billing(sheet: &Table, sample_files: &BTreeMap<String, Vec<PathBuf>>) -> BillingReport {
    let mut by_project: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for i in 0..sheet.len() {
        let project = sheet.value(i, PROJECT_COLUMN);
        if project.is_empty() {
            continue;
        }
        by_project.entry(project.to_string()).or_default().push(i);
    }

    let mut report = BillingReport {
        projects: Table::with_columns(PROJECT_COLUMNS),
        samples: Table::with_columns(SAMPLE_COLUMNS),
        files: Table::with_columns(FILE_COLUMNS),
    };

    for (project, rows) in &by_project {
        debug!("Searching for files associated with {project}");
        let mut found: usize = 0;
        for &i in rows {
            let sample_id = sheet.value(i, SAMPLE_ID_COLUMN).to_string();
            let sample_name = sheet.value(i, SAMPLE_NAME_COLUMN).clone();
            let files = sample_files
                .get(&sample_id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for file in files {
                report.files.push(
                    Row::new()
                        .with(
                            "sampleDate",
                            date_from_path(file).map(|d| d.format("%Y-%m-%d").to_string()),
                        )
                        .with(SAMPLE_ID_COLUMN, sample_id.as_str())
                        .with(PROJECT_COLUMN, project.as_str())
                        .with(SAMPLE_NAME_COLUMN, sample_name.clone())
                        .with("filename", file.display().to_string()),
                );
            }
            if !files.is_empty() {
                found += 1;
            }

            report.samples.push(
                Row::new()
                    .with(SAMPLE_ID_COLUMN, sample_id.as_str())
                    .with(SAMPLE_NAME_COLUMN, sample_name)
                    .with(PROJECT_COLUMN, project.as_str())
                    .with("files", files.len()),
            );
        }

        report.projects.push(
            Row::new()
                .with(PROJECT_COLUMN, project.as_str())
                .with("expectedSamples", rows.len())
                .with("foundSamples", found)
                .with("missingSamples", rows.len() - found),
        );
    }
    report
}

/// Write the combined sheet and the billing tables to one workbook
///
/// # Errors
///
/// Returns `TableError` if a sheet cannot be written or the file cannot be saved.
pub fn write_billing(sheet: &Table, report: &BillingReport, path: &Path) -> Result<(), TableError> {
    let mut writer = WorkbookWriter::new();
    writer.add_table("fullList", sheet)?;
    writer.add_table("projects", &report.projects)?;
    writer.add_table("samples", &report.samples)?;
    writer.add_table("files", &report.files)?;
    writer.save(path)
}
