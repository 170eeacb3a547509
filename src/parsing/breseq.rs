//! Parser for breseq `output/index.html` mutation reports.
//!
//! A breseq report is one HTML page with three tables of interest:
//!
//! - **Predicted mutations**: rows with class `normal_table_row` or
//!   `polymorphism_table_row`, headed by the row holding an `evidence` cell
//! - **Unassigned missing coverage evidence**: the rows following the
//!   `missing_coverage_header_row` title cell
//! - **Unassigned new junction evidence**: the rows following the
//!   `new_junction_header_row` title cell, two physical rows per junction
//!
//! Sections are located by walking the parsed document, never by byte offsets.
//! A section that is absent from the page yields no rows. A section that is
//! present but whose header cannot be mapped onto the expected columns is a
//! [`ReportError::Schema`].

use std::path::Path;

use deunicode::deunicode;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::coerce::{coerce_number, parse_percent};
use crate::core::table::{Cell, Row};

/// Column added to every row naming the sample it came from
pub const SAMPLE_COLUMN: &str = "Sample";
pub const SEQ_ID_COLUMN: &str = "seq id";
pub const POSITION_COLUMN: &str = "position";
pub const FREQ_COLUMN: &str = "freq";
pub const FREQ_PERCENT_COLUMN: &str = "freq %";

const MUTATION_ROW_CLASSES: [&str; 2] = ["normal_table_row", "polymorphism_table_row"];
const MUTATION_HEADER_MARKER: &str = "evidence";
const COVERAGE_SECTION_CLASS: &str = "missing_coverage_header_row";
const JUNCTION_SECTION_CLASS: &str = "new_junction_header_row";
const SECTION_CLASS_SUFFIX: &str = "_header_row";
const COVERAGE_NUMERIC_COLUMNS: [&str; 3] = ["start", "end", "size"];

const JUNCTION_LEADING_COLUMNS: [&str; 2] = ["0", "1"];
const JUNCTION_SINGLE_READ_INDEX: usize = 4;
const JUNCTION_SIDE_A_ONLY: [&str; 5] = ["0", "reads (cov)", "score", "skew", "freq"];
const JUNCTION_REQUIRED_COLUMNS: [&str; 2] = [SEQ_ID_COLUMN, POSITION_COLUMN];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("{section} table does not match the expected layout: {message}")]
    Schema {
        section: &'static str,
        message: String,
    },
}

impl ReportError {
    fn schema(section: &'static str, message: impl Into<String>) -> Self {
        Self::Schema {
            section,
            message: message.into(),
        }
    }
}

/// Rows extracted from one sample's report
#[derive(Debug, Clone, Default)]
pub struct SampleReport {
    pub sample: String,
    pub mutations: Vec<Row>,
    pub coverage: Vec<Row>,
    pub junctions: Vec<Row>,
}

/// The three table sections of a parsed report
#[derive(Debug)]
pub struct ReportSections<'a> {
    /// Column names of the predicted-mutation table
    pub mutation_header: Vec<String>,
    /// Mutation rows, all normal rows first, then polymorphism rows
    pub mutation_rows: Vec<ElementRef<'a>>,
    /// Coverage column-header row followed by its data rows
    pub coverage_rows: Vec<ElementRef<'a>>,
    /// Junction column-header row followed by its data row pairs
    pub junction_rows: Vec<ElementRef<'a>>,
}

/// Parse the report at `path` for `sample`
///
/// # Errors
///
/// Returns `ReportError::Io` if the file cannot be read, or
/// `ReportError::Schema` if a table is present but its header is unusable.
pub fn parse_report_file(sample: &str, path: &Path) -> Result<SampleReport, ReportError> {
    let contents = std::fs::read_to_string(path)?;
    parse_report(sample, &contents)
}

/// Parse report HTML text for `sample`
///
/// # Errors
///
/// Returns `ReportError::Schema` if a table is present but its header is unusable.
pub fn parse_report(sample: &str, html: &str) -> Result<SampleReport, ReportError> {
    let document = Html::parse_document(html);
    let sections = split_sections(&document)?;

    let mutations = extract_mutations(sample, &sections.mutation_header, &sections.mutation_rows)?;
    let coverage = extract_coverage(sample, &sections.coverage_rows);
    let junctions = extract_junctions(sample, &sections.junction_rows)?;

    debug!(
        "{sample}: {} mutations, {} coverage rows, {} junction rows",
        mutations.len(),
        coverage.len(),
        junctions.len()
    );

    Ok(SampleReport {
        sample: sample.to_string(),
        mutations,
        coverage,
        junctions,
    })
}

/// Locate the mutation, coverage and junction sections of a report
///
/// # Errors
///
/// Returns `ReportError::Selector` only if a built-in selector fails to parse.
pub fn split_sections(document: &Html) -> Result<ReportSections<'_>, ReportError> {
    let tr = selector("tr")?;
    let all_rows: Vec<ElementRef<'_>> = document.select(&tr).collect();

    let mut mutation_rows = Vec::new();
    for class in MUTATION_ROW_CLASSES {
        let by_class = selector(&format!(".{class}"))?;
        mutation_rows.extend(document.select(&by_class));
    }

    let mutation_header = all_rows
        .iter()
        .find_map(|row| {
            let cells: Vec<String> = child_cells(*row, "th").map(cell_text).collect();
            let start = cells.iter().position(|c| c == MUTATION_HEADER_MARKER)?;
            Some(cells[start..].to_vec())
        })
        .unwrap_or_default();

    Ok(ReportSections {
        mutation_header,
        mutation_rows,
        coverage_rows: section_rows(&all_rows, COVERAGE_SECTION_CLASS),
        junction_rows: section_rows(&all_rows, JUNCTION_SECTION_CLASS),
    })
}

/// Build mutation rows by zipping `header` onto each row's cells
///
/// Rows with a single cell are section captions and are skipped. `position`
/// is coerced to an integer and a trailing-`%` `freq` becomes a numeric
/// `freq %` column.
///
/// # Errors
///
/// Returns `ReportError::Schema` if there are mutation rows but the header
/// has no `position` column.
pub fn extract_mutations(
    sample: &str,
    header: &[String],
    rows: &[ElementRef<'_>],
) -> Result<Vec<Row>, ReportError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    if !header.iter().any(|h| h == POSITION_COLUMN) {
        return Err(ReportError::schema(
            "mutation",
            format!("no '{POSITION_COLUMN}' column in header {header:?}"),
        ));
    }

    let mut table = Vec::with_capacity(rows.len());
    for tag in rows {
        let values: Vec<String> = child_cells(*tag, "td").map(cell_text).collect();
        if values.len() <= 1 {
            continue;
        }

        let mut row: Row = header.iter().cloned().zip(values).collect();
        row.insert(SAMPLE_COLUMN, sample);

        if let Some(position) = row.get_mut(POSITION_COLUMN) {
            coerce_number(position);
        }
        let percent = row
            .get(FREQ_COLUMN)
            .and_then(Cell::as_text)
            .and_then(parse_percent);
        if let Some(percent) = percent {
            row.replace(FREQ_COLUMN, FREQ_PERCENT_COLUMN, Cell::Float(percent));
        }

        table.push(row);
    }
    Ok(table)
}

/// Build missing-coverage rows
///
/// `rows` starts with the column-header row. Blank column names are replaced
/// with their column index.
pub fn extract_coverage(sample: &str, rows: &[ElementRef<'_>]) -> Vec<Row> {
    let Some((header, data)) = rows.split_first() else {
        warn!("{sample}: could not find the missing coverage table");
        return Vec::new();
    };

    let column_names: Vec<String> = child_cells(*header, "th")
        .map(cell_text)
        .enumerate()
        .map(|(i, name)| if name.is_empty() { i.to_string() } else { name })
        .collect();

    let mut table = Vec::with_capacity(data.len());
    for tag in data {
        let values: Vec<String> = child_cells(*tag, "td").map(cell_text).collect();
        if values.len() <= 1 {
            continue;
        }

        let mut row = Row::new().with(SAMPLE_COLUMN, sample);
        for (name, value) in column_names.iter().zip(values) {
            row.insert(name.clone(), value);
        }
        for column in COVERAGE_NUMERIC_COLUMNS {
            if let Some(cell) = row.get_mut(column) {
                coerce_number(cell);
            }
        }
        table.push(row);
    }
    table
}

/// Build junction rows, two per junction in physical order
///
/// `rows` starts with the column-header row; the remaining rows are consumed
/// in pairs. A trailing unpaired row is ignored. Text is folded to ASCII.
///
/// # Errors
///
/// Returns `ReportError::Schema` if the header does not fit [`JunctionSchema`].
pub fn extract_junctions(sample: &str, rows: &[ElementRef<'_>]) -> Result<Vec<Row>, ReportError> {
    let Some((header, data)) = rows.split_first() else {
        warn!("{sample}: could not find the new junction table");
        return Ok(Vec::new());
    };

    let header: Vec<String> = child_cells(*header, "th").map(ascii_cell_text).collect();
    let schema = JunctionSchema::from_header(&header)?;

    if data.len() % 2 == 1 {
        debug!("{sample}: ignoring unpaired trailing junction row");
    }

    let mut table = Vec::with_capacity(data.len());
    for pair in data.chunks_exact(2) {
        for (tag, columns) in [(pair[0], &schema.side_a), (pair[1], &schema.side_b)] {
            let mut row: Row = columns
                .iter()
                .cloned()
                .zip(child_cells(tag, "td").map(ascii_cell_text))
                .collect();
            row.insert(SAMPLE_COLUMN, sample);
            table.push(row);
        }
    }
    Ok(table)
}

/// Column layout of the new-junction table.
///
/// Each junction spans two physical rows. Side A has a cell for every column.
/// Side B lacks the cells side A spans over both rows (`rowspan="2"`): the
/// leading evidence link, the combined read count, score, skew and frequency.
///
/// The header row has a single blank cell over the two link columns, which
/// are named `0` and `1`. Column 4 is the per-side read count and is renamed
/// `reads (cov) (single)` to tell it apart from the combined `reads (cov)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunctionSchema {
    pub side_a: Vec<String>,
    pub side_b: Vec<String>,
}

impl JunctionSchema {
    /// Derive the schema from the junction header cells
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Schema` if the header is too short or lacks a
    /// `seq id` or `position` column.
    pub fn from_header(header: &[String]) -> Result<Self, ReportError> {
        let mut side_a: Vec<String> = JUNCTION_LEADING_COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain(header.iter().skip(1).cloned())
            .collect();

        let found = side_a.len();
        let Some(single) = side_a.get_mut(JUNCTION_SINGLE_READ_INDEX) else {
            return Err(ReportError::schema(
                "junction",
                format!(
                    "expected at least {} columns, found {found}",
                    JUNCTION_SINGLE_READ_INDEX + 1
                ),
            ));
        };
        *single = format!("{single} (single)");

        let side_b = side_a
            .iter()
            .filter(|c| !junction_side_a_only_columns().contains(&c.as_str()))
            .cloned()
            .collect();

        let schema = Self { side_a, side_b };
        schema.validate()?;
        Ok(schema)
    }

    fn validate(&self) -> Result<(), ReportError> {
        for column in JUNCTION_REQUIRED_COLUMNS {
            if !self.side_a.iter().any(|c| c == column) || !self.side_b.iter().any(|c| c == column)
            {
                return Err(ReportError::schema(
                    "junction",
                    format!("no '{column}' column in header {:?}", self.side_a),
                ));
            }
        }
        Ok(())
    }
}

/// Columns that appear only on side A of a junction, as named in the output
#[must_use]
pub fn junction_side_a_only_columns() -> &'static [&'static str] {
    &JUNCTION_SIDE_A_ONLY
}

fn selector(css: &str) -> Result<Selector, ReportError> {
    Selector::parse(css).map_err(|e| ReportError::Selector(format!("{css}: {e}")))
}

/// Rows after the title row carrying a `th` of `class`, up to the next section title
fn section_rows<'a>(rows: &[ElementRef<'a>], class: &str) -> Vec<ElementRef<'a>> {
    let Some(start) = rows.iter().position(|row| {
        child_cells(*row, "th").any(|th| th.value().classes().any(|c| c == class))
    }) else {
        return Vec::new();
    };

    rows[start + 1..]
        .iter()
        .take_while(|row| !is_section_title(**row))
        .copied()
        .collect()
}

fn is_section_title(row: ElementRef<'_>) -> bool {
    child_cells(row, "th").any(|th| {
        th.value()
            .classes()
            .any(|c| c.ends_with(SECTION_CLASS_SUFFIX))
    })
}

fn child_cells<'a>(row: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(move |e| e.value().name() == name)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

fn ascii_cell_text(cell: ElementRef<'_>) -> String {
    deunicode(&cell_text(cell)).trim().to_string()
}
