//! CSV/TSV table writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::table::Table;
use crate::parsing::tables::TableError;

/// Write `table` to `path` with a header row
///
/// # Errors
///
/// Returns `TableError::Io` or `TableError::Csv` if the file cannot be written.
pub fn write_delimited(table: &Table, path: &Path, delimiter: u8) -> Result<(), TableError> {
    let file = File::create(path)?;
    write_delimited_to(table, BufWriter::new(file), delimiter)
}

/// Write `table` to any writer with a header row. Missing values are blank.
///
/// # Errors
///
/// Returns `TableError` if writing fails.
pub fn write_delimited_to<W: Write>(
    table: &Table,
    writer: W,
    delimiter: u8,
) -> Result<(), TableError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    if !table.columns().is_empty() {
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(
                table
                    .columns()
                    .iter()
                    .map(|column| row.get(column).map(ToString::to_string).unwrap_or_default()),
            )?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::{Cell, Row};
    use crate::parsing::tables::read_delimited_from;

    fn sample_table() -> Table {
        Table::from_rows([
            Row::new()
                .with("seq id", "NC_001")
                .with("position", 1234_i64)
                .with("freq %", 87.5)
                .with("annotation", "intergenic (-12/+45)"),
            Row::new()
                .with("seq id", "NC_001")
                .with("position", 500_i64)
                .with("Sample", "s2"),
        ])
    }

    #[test]
    fn test_write_csv_quotes_separators() {
        let mut out = Vec::new();
        let table = Table::from_rows([Row::new().with("gene", "geneA, geneB").with("n", 1_i64)]);
        write_delimited_to(&table, &mut out, b',').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "gene,n\n\"geneA, geneB\",1\n");
    }

    #[test]
    fn test_tsv_round_trip_rows_and_columns() {
        let table = sample_table();
        let mut out = Vec::new();
        write_delimited_to(&table, &mut out, b'\t').unwrap();

        let back = read_delimited_from(out.as_slice(), b'\t').unwrap();
        assert_eq!(back.len(), table.len());
        assert_eq!(back.columns(), table.columns());
        assert_eq!(back.value(0, "position"), &Cell::Int(1234));
        assert_eq!(back.value(0, "freq %"), &Cell::Float(87.5));
        assert_eq!(back.value(0, "Sample"), &Cell::Empty);
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let mut out = Vec::new();
        write_delimited_to(&Table::new(), &mut out, b',').unwrap();
        assert!(out.is_empty());
    }
}
