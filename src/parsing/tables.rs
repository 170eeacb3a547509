//! Readers for spreadsheet-like inputs: CSV, TSV and Excel workbooks.
//!
//! The first row is the header. Values are inferred as numbers where the
//! text allows it, so tables written by this crate read back with the same
//! columns and comparable values.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use thiserror::Error;

use crate::core::table::{Cell, Row, Table};

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook read error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Workbook has no sheets")]
    EmptyWorkbook,

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Table too large for a worksheet: {0} rows or columns")]
    TooLarge(usize),
}

/// Read a table, choosing the reader from the file extension
///
/// `.xlsx`, `.xlsm`, `.xls` and `.ods` are read as workbooks (`sheet`, or the
/// first sheet). `.tsv`, `.tab` and `.txt` are tab-delimited; anything else is
/// read as CSV.
///
/// # Errors
///
/// Returns `TableError` if the file cannot be read or the sheet does not exist.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table, TableError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("xlsx" | "xlsm" | "xls" | "ods") => read_workbook(path, sheet),
        Some("tsv" | "tab" | "txt") => read_delimited(path, b'\t'),
        _ => read_delimited(path, b','),
    }
}

/// Read a delimited text file
///
/// # Errors
///
/// Returns `TableError::Io` or `TableError::Csv` on read failures.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Table, TableError> {
    let file = std::fs::File::open(path)?;
    read_delimited_from(file, delimiter)
}

/// Read delimited text from any reader
///
/// # Errors
///
/// Returns `TableError::Csv` on malformed input.
pub fn read_delimited_from<R: Read>(reader: R, delimiter: u8) -> Result<Table, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::with_columns(header.iter().cloned());

    for record in reader.records() {
        let record = record?;
        let row: Row = header
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.clone(), Cell::infer(value)))
            .collect();
        table.push(row);
    }
    Ok(table)
}

/// Read one sheet of a workbook; the first sheet when `sheet` is `None`
///
/// # Errors
///
/// Returns `TableError::SheetNotFound` for an unknown sheet name,
/// `TableError::EmptyWorkbook` if there are no sheets, or
/// `TableError::Workbook` if the file is not a readable workbook.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Table, TableError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(TableError::SheetNotFound(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or(TableError::EmptyWorkbook)??,
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::new());
    };
    let header: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell.to_string();
            if name.trim().is_empty() {
                format!("column_{i}")
            } else {
                name
            }
        })
        .collect();

    let mut table = Table::with_columns(header.iter().cloned());
    for values in rows {
        if values.iter().all(|v| matches!(v, Data::Empty)) {
            continue;
        }
        let row: Row = header
            .iter()
            .zip(values)
            .map(|(column, value)| (column.clone(), data_to_cell(value)))
            .collect();
        table.push(row);
    }
    Ok(table)
}

/// Convert a workbook cell. Whole floats become integers and dates render as
/// `YYYY-MM-DD` (with the time when it is not midnight).
fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Int(*n),
        #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 9.0e15 {
                Cell::Int(*f as i64)
            } else {
                Cell::Float(*f)
            }
        }
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                Cell::Text(datetime.date().format("%Y-%m-%d").to_string())
            }
            Some(datetime) => Cell::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Float(dt.as_f64()),
        },
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_delimited_infers_numbers() {
        let text = "Sample,position,freq %,gene\ns1,1234,87.5,dnaA\ns2,500,,\n";
        let table = read_delimited_from(text.as_bytes(), b',').unwrap();
        assert_eq!(table.columns(), ["Sample", "position", "freq %", "gene"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "position"), &Cell::Int(1234));
        assert_eq!(table.value(0, "freq %"), &Cell::Float(87.5));
        assert_eq!(table.value(1, "gene"), &Cell::Empty);
    }

    #[test]
    fn test_read_tsv_keeps_commas() {
        let text = "id\tvalue\na\t1,234\n";
        let table = read_delimited_from(text.as_bytes(), b'\t').unwrap();
        assert_eq!(table.value(0, "value"), &Cell::text("1,234"));
    }

    #[test]
    fn test_read_empty_input() {
        let table = read_delimited_from("".as_bytes(), b',').unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn test_data_to_cell_whole_float() {
        assert_eq!(data_to_cell(&Data::Float(273.0)), Cell::Int(273));
        assert_eq!(data_to_cell(&Data::Float(2.5)), Cell::Float(2.5));
        assert_eq!(data_to_cell(&Data::Empty), Cell::Empty);
    }
}
