//! Excel workbook writer.
//!
//! Each table becomes one worksheet with a bold header row. Numbers are
//! written as numbers, everything else as strings, and missing values stay
//! blank.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use crate::core::table::{Cell, Table};
use crate::parsing::tables::TableError;

/// Fill used for cells matching a highlighted value
const HIGHLIGHT_COLOR: u32 = 0x00FF_EB9C;

pub struct WorkbookWriter {
    workbook: Workbook,
    header: Format,
    merged: Format,
    highlight: Format,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            header: Format::new().set_bold(),
            merged: Format::new().set_align(FormatAlign::VerticalCenter),
            highlight: Format::new().set_background_color(Color::RGB(HIGHLIGHT_COLOR)),
        }
    }

    /// Add a sheet holding `table`
    ///
    /// # Errors
    ///
    /// Returns `TableError::Xlsx` for an invalid sheet name or a write failure.
    pub fn add_table(&mut self, name: &str, table: &Table) -> Result<(), TableError> {
        self.add_sheet(name, table, &[], None)
    }

    /// Add a sheet where cells equal to `value` get a highlight fill
    ///
    /// # Errors
    ///
    /// Returns `TableError::Xlsx` for an invalid sheet name or a write failure.
    pub fn add_highlighted_table(
        &mut self,
        name: &str,
        table: &Table,
        value: &str,
    ) -> Result<(), TableError> {
        self.add_sheet(name, table, &[], Some(value))
    }

    /// Add a sheet whose rows come in pairs and merge each pair vertically in
    /// `merge_columns`, keeping the first row's value
    ///
    /// For breseq junctions the merge columns are `Sample` plus the columns of
    /// `junction_side_a_only_columns`, which span both rows of a junction.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Xlsx` for an invalid sheet name or a write failure.
    pub fn add_paired_table(
        &mut self,
        name: &str,
        table: &Table,
        merge_columns: &[&str],
    ) -> Result<(), TableError> {
        self.add_sheet(name, table, merge_columns, None)
    }

    /// Save the workbook to `path`
    ///
    /// # Errors
    ///
    /// Returns `TableError::Xlsx` if the file cannot be written.
    pub fn save(mut self, path: &Path) -> Result<(), TableError> {
        self.workbook.save(path)?;
        Ok(())
    }

    fn add_sheet(
        &mut self,
        name: &str,
        table: &Table,
        merge_columns: &[&str],
        highlight: Option<&str>,
    ) -> Result<(), TableError> {
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(name)?;

        for (col, column) in table.columns().iter().enumerate() {
            worksheet.write_string_with_format(0, to_col(col)?, column, &self.header)?;
        }

        let merged: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| merge_columns.contains(&c.as_str()))
            .map(|(i, _)| i)
            .collect();
        let paired_rows = table.len() - table.len() % 2;

        for (i, row) in table.rows().iter().enumerate() {
            let excel_row = to_row(i + 1)?;
            for (col, column) in table.columns().iter().enumerate() {
                if i < paired_rows && merged.contains(&col) {
                    continue;
                }
                let Some(cell) = row.get(column) else {
                    continue;
                };
                let format = match highlight {
                    Some(value) if cell.to_string() == value => Some(&self.highlight),
                    _ => None,
                };
                write_cell(worksheet, excel_row, to_col(col)?, cell, format)?;
            }
        }

        for pair in (0..paired_rows).step_by(2) {
            let first = to_row(pair + 1)?;
            for &col in &merged {
                let cell = table.value(pair, &table.columns()[col]);
                let col = to_col(col)?;
                worksheet.merge_range(first, col, first + 1, col, &cell.to_string(), &self.merged)?;
                if matches!(cell, Cell::Int(_) | Cell::Float(_)) {
                    write_cell(worksheet, first, col, cell, Some(&self.merged))?;
                }
            }
        }

        if !table.columns().is_empty() {
            worksheet.set_freeze_panes(1, 0)?;
        }
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<(), TableError> {
    let default = Format::new();
    let format = format.unwrap_or(&default);
    match cell {
        Cell::Empty => {}
        Cell::Text(s) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        #[allow(clippy::cast_precision_loss)]
        Cell::Int(n) => {
            worksheet.write_number_with_format(row, col, *n as f64, format)?;
        }
        Cell::Float(x) => {
            worksheet.write_number_with_format(row, col, *x, format)?;
        }
    }
    Ok(())
}

fn to_row(i: usize) -> Result<u32, TableError> {
    u32::try_from(i).map_err(|_| TableError::TooLarge(i))
}

fn to_col(i: usize) -> Result<u16, TableError> {
    u16::try_from(i).map_err(|_| TableError::TooLarge(i))
}
