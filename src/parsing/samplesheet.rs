//! Illumina `SampleSheet.csv` discovery and parsing.
//!
//! A sample sheet starts with `[Header]`, `[Reads]` and `[Settings]`
//! sections; the `[Data]` section follows with its own header row whose first
//! cell is `Sample_ID` (older sheets use `SampleID`). Every non-blank row after
//! it is one sample.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::config::ColumnMap;
use crate::core::table::{Cell, Row, Table};

pub const SAMPLE_SHEET_NAME: &str = "SampleSheet.csv";

/// Deepest directory level below a search root that may hold a sample sheet
pub const MAX_SEARCH_DEPTH: usize = 4;

/// Column derived from the sample id prefix
pub const DATE_COLUMN: &str = "date";

const SAMPLE_ID_HEADERS: [&str; 2] = ["Sample_ID", "SampleID"];

#[derive(Error, Debug)]
pub enum SampleSheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("No Sample_ID header row in {0}")]
    NoHeader(PathBuf),
}

/// Every `SampleSheet.csv` below `folder`, sorted
///
/// # Errors
///
/// Returns `SampleSheetError::Walk` if the folder cannot be traversed.
pub fn find_sample_sheets(folder: &Path) -> Result<Vec<PathBuf>, SampleSheetError> {
    let mut sheets = Vec::new();
    for entry in WalkDir::new(folder).max_depth(MAX_SEARCH_DEPTH) {
        let entry = entry.map_err(|source| SampleSheetError::Walk {
            path: folder.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.file_name() == SAMPLE_SHEET_NAME {
            sheets.push(entry.into_path());
        }
    }
    sheets.sort();
    Ok(sheets)
}

/// Read the data section of one sample sheet, renaming columns with `columns`
///
/// # Errors
///
/// Returns `SampleSheetError::NoHeader` if no row starts with a sample id
/// header, or an IO/CSV error if the file cannot be read.
pub fn read_sample_sheet(path: &Path, columns: &ColumnMap) -> Result<Table, SampleSheetError> {
    read_sample_sheet_from(File::open(path)?, columns)?
        .ok_or_else(|| SampleSheetError::NoHeader(path.to_path_buf()))
}

/// Parse a sample sheet from `reader`; `None` if it has no data header
///
/// # Errors
///
/// Returns `SampleSheetError::Csv` on malformed CSV.
pub fn read_sample_sheet_from<R: Read>(
    reader: R,
    columns: &ColumnMap,
) -> Result<Option<Table>, SampleSheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut header: Option<Vec<String>> = None;
    let mut table = Table::new();
    for record in reader.records() {
        let record = record?;
        if header.is_none() {
            if record
                .get(0)
                .is_some_and(|first| SAMPLE_ID_HEADERS.contains(&first.trim()))
            {
                header = Some(
                    record
                        .iter()
                        .map(|name| columns.rename(name.trim()).to_string())
                        .collect(),
                );
            }
            continue;
        }
        let Some(names) = &header else {
            continue;
        };

        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let row: Row = names
            .iter()
            .zip(record.iter())
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| (name.clone(), sheet_cell(value)))
            .collect();
        table.push(row);
    }

    Ok(header.map(|_| table))
}

/// Combine the sample sheets at `paths` into one table
///
/// Unreadable sheets are logged and skipped. A `date` column is derived from
/// each sample id and fully duplicated rows are dropped.
#[must_use]
pub fn combine_sample_sheets(paths: &[PathBuf], columns: &ColumnMap) -> Table {
    let mut combined = Table::new();
    for path in paths {
        match read_sample_sheet(path, columns) {
            Ok(table) => {
                debug!("Read {} samples from {}", table.len(), path.display());
                combined.append(table);
            }
            Err(e) => warn!("Skipping {}: {e}", path.display()),
        }
    }

    let sample_id = columns.rename("Sample_ID").to_string();
    combined.add_column(DATE_COLUMN);
    for i in 0..combined.len() {
        let date = combined
            .value(i, &sample_id)
            .as_text()
            .and_then(date_from_sample_id)
            .map(|d| d.format("%Y-%m-%d").to_string());
        combined.set(i, DATE_COLUMN, date.into());
    }
    info!("Found {} samples", combined.len());

    combined.drop_duplicates();
    info!(
        "Found {} samples after removing duplicate rows",
        combined.len()
    );
    combined
}

/// Date encoded in a `MMDDYY_...` sample id prefix
///
/// # Examples
///
/// ```
/// use bactools::parsing::samplesheet::date_from_sample_id;
/// use chrono::NaiveDate;
///
/// assert_eq!(date_from_sample_id("101818_AU1234"), NaiveDate::from_ymd_opt(2018, 10, 18));
/// assert_eq!(date_from_sample_id("AU1234"), None);
/// ```
#[must_use]
pub fn date_from_sample_id(sample_id: &str) -> Option<NaiveDate> {
    let prefix = sample_id.split('_').next()?;
    let month = prefix.get(..2)?.parse().ok()?;
    let day = prefix.get(2..4)?.parse().ok()?;
    let year: i32 = prefix.get(4..)?.parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Sample sheet values are kept as text so ids and indices keep leading zeros
fn sheet_cell(value: &str) -> Cell {
    let value = value.trim();
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SHEET: &str = "[Header],,,\nIEMFileVersion,4,,\nDate,10/18/2018,,\n\n[Reads],,,\n151,,,\n\n[Data],,,\nSample_ID,Sample_Name,Project,index,\n101818_AU1234,AU1234,Cystic,0017,\n101818_AU5678,AU5678,Cystic,ATCG,\n,,,,\nundated,U1,Other,GGCC,\n";

    #[test]
    fn test_read_sample_sheet() {
        let table = read_sample_sheet_from(Cursor::new(SHEET), &ColumnMap::default())
            .unwrap()
            .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.columns(),
            &["sampleId", "sampleName", "projectName", "index"]
        );
        assert_eq!(table.value(0, "index"), &Cell::text("0017"));
        assert_eq!(table.value(2, "projectName"), &Cell::text("Other"));
    }

    #[test]
    fn test_read_sample_sheet_without_header() {
        let result =
            read_sample_sheet_from(Cursor::new("[Header]\nfoo,bar\n"), &ColumnMap::default())
                .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_date_from_sample_id() {
        assert_eq!(
            date_from_sample_id("061519_S1"),
            NaiveDate::from_ymd_opt(2019, 6, 15)
        );
        assert_eq!(date_from_sample_id("139918_S1"), None);
        assert_eq!(date_from_sample_id("1018"), None);
    }

    #[test]
    fn test_find_and_combine() {
        let dir = tempfile::tempdir().unwrap();
        let shallow = dir.path().join("run1");
        let deep = dir.path().join("a/b/c/d/e");
        std::fs::create_dir_all(&shallow).unwrap();
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(shallow.join(SAMPLE_SHEET_NAME), SHEET).unwrap();
        std::fs::write(deep.join(SAMPLE_SHEET_NAME), SHEET).unwrap();
        std::fs::write(shallow.join("notes.csv"), "x").unwrap();

        let sheets = find_sample_sheets(dir.path()).unwrap();
        assert_eq!(sheets, vec![shallow.join(SAMPLE_SHEET_NAME)]);

        // The same sheet twice collapses to one set of samples
        let table = combine_sample_sheets(&[sheets[0].clone(), sheets[0].clone()], &ColumnMap::default());
        assert_eq!(table.len(), 3);
        assert_eq!(table.value(0, DATE_COLUMN), &Cell::text("2018-10-18"));
        assert!(table.value(2, DATE_COLUMN).is_empty());
    }
}
