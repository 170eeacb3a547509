//! Cross-sample comparison of mutation positions.
//!
//! The comparison matrix has one row per distinct `(seq id, position)` found
//! in the aggregated mutation table and one column per sample. A sample's
//! column holds `X` when it is the only sample with a mutation at that
//! position, `.` when other samples share the position, and is blank when the
//! sample has no mutation there. The `all` column is `.` when every sample in
//! the table has a mutation at the position.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::table::{Cell, Row, Table};
use crate::parsing::breseq::{POSITION_COLUMN, SAMPLE_COLUMN, SEQ_ID_COLUMN};

pub const ALL_COLUMN: &str = "all";
pub const UNIQUE_MARK: &str = "X";
pub const SHARED_MARK: &str = ".";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("mutation table has no '{0}' column")]
    MissingColumn(&'static str),
}

/// Outcome of building the comparison matrix
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// One row per `(seq id, position)`
    Matrix(Table),
    /// The mutation table has no rows
    NoData,
}

impl Comparison {
    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Matrix(table) => Some(table),
            Self::NoData => None,
        }
    }
}

/// Sort key for a position cell: integers in numeric order before text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PositionKey {
    Int(i64),
    Text(String),
}

impl PositionKey {
    fn from_cell(cell: &Cell) -> Self {
        match cell {
            Cell::Int(n) => Self::Int(*n),
            other => Self::Text(other.to_string()),
        }
    }

    fn to_cell(&self) -> Cell {
        match self {
            Self::Int(n) => Cell::Int(*n),
            Self::Text(s) => Cell::Text(s.clone()),
        }
    }
}

/// Build the comparison matrix from an aggregated mutation table
///
/// Rows are ordered by sequence id, then position. Sample columns follow
/// the order in which samples first appear in `mutations`.
///
/// # Errors
///
/// Returns `ComparisonError::MissingColumn` if the table has rows but lacks
/// the `Sample`, `seq id` or `position` column.
pub fn compare_samples(mutations: &Table) -> Result<Comparison, ComparisonError> {
    if mutations.is_empty() {
        return Ok(Comparison::NoData);
    }
    for column in [SAMPLE_COLUMN, SEQ_ID_COLUMN, POSITION_COLUMN] {
        if !mutations.has_column(column) {
            return Err(ComparisonError::MissingColumn(column));
        }
    }

    let samples: Vec<String> = mutations
        .distinct(SAMPLE_COLUMN)
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut groups: BTreeMap<(String, PositionKey), Vec<&str>> = BTreeMap::new();
    for i in 0..mutations.len() {
        let sample = mutations.value(i, SAMPLE_COLUMN).to_string();
        let Some(name) = samples.iter().find(|s| **s == sample) else {
            continue;
        };
        let seq_id = mutations.value(i, SEQ_ID_COLUMN).to_string();
        let position = PositionKey::from_cell(mutations.value(i, POSITION_COLUMN));
        let members = groups.entry((seq_id, position)).or_default();
        if !members.contains(&name.as_str()) {
            members.push(name.as_str());
        }
    }

    let mut matrix = Table::with_columns(
        [SEQ_ID_COLUMN, POSITION_COLUMN]
            .into_iter()
            .map(String::from)
            .chain(samples.iter().cloned())
            .chain([ALL_COLUMN.to_string()]),
    );

    for ((seq_id, position), members) in &groups {
        let mark = if members.len() == 1 {
            UNIQUE_MARK
        } else {
            SHARED_MARK
        };
        let mut row = Row::new()
            .with(SEQ_ID_COLUMN, seq_id.as_str())
            .with(POSITION_COLUMN, position.to_cell());
        for sample in &samples {
            if members.contains(&sample.as_str()) {
                row.insert(sample.as_str(), mark);
            }
        }
        let all = if members.len() == samples.len() {
            SHARED_MARK
        } else {
            ""
        };
        row.insert(ALL_COLUMN, all);
        matrix.push(row);
    }

    Ok(Comparison::Matrix(matrix))
}
