//! In-memory tables shared by every tool.
//!
//! A [`Table`] is a list of [`Row`]s plus the union of their column names in
//! first-seen order, which is what the writers use as the header. Rows are
//! ordered column→[`Cell`] mappings; a row may omit any column, in which case
//! the value reads back as [`Cell::Empty`].

use std::collections::HashSet;
use std::fmt;

/// A single table value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Infer a cell from text read back from a delimited file or workbook.
    ///
    /// Plain integers and floats become numeric cells; everything else stays
    /// text. Blank strings become [`Cell::Empty`].
    #[must_use]
    pub fn infer(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Int(n);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        Self::Text(s.to_string())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Int(_) | Self::Float(_) => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<usize> for Cell {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or_else(|_| Self::Text(n.to_string()), Self::Int)
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// An ordered column→value mapping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column. An existing column keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Cell>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    /// Builder form of [`Row::insert`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Cell> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Cell> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    /// Replace `old` with a new key and value in the same position.
    ///
    /// Returns `false` if `old` is not present.
    pub fn replace(&mut self, old: &str, new_key: impl Into<String>, value: Cell) -> bool {
        let new_key = new_key.into();
        if !self.contains(old) {
            return false;
        }
        if new_key != old {
            self.fields.retain(|(k, _)| *k != new_key);
        }
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| k == old) {
            *slot = (new_key, value);
        }
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Cell>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Rows plus the ordered union of their columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with a fixed leading column order
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for column in columns {
            table.add_column(column);
        }
        table
    }

    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut table = Self::new();
        table.extend_rows(rows);
        table
    }

    pub fn add_column(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }

    pub fn push(&mut self, row: Row) {
        for key in row.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.to_string());
            }
        }
        self.rows.push(row);
    }

    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = Row>) {
        for row in rows {
            self.push(row);
        }
    }

    /// Append all rows of `other`, growing the column set as needed
    pub fn append(&mut self, other: Table) {
        for column in other.columns {
            self.add_column(column);
        }
        self.rows.extend(other.rows);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Value at `row`/`column`, [`Cell::Empty`] when the row lacks the column
    pub fn value(&self, row: usize, column: &str) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Set the value of `column` in row `row`, adding the column if needed
    pub fn set(&mut self, row: usize, column: &str, value: Cell) {
        if let Some(r) = self.rows.get_mut(row) {
            r.insert(column, value);
            self.add_column(column);
        }
    }

    /// Rename a column in the header and in every row that has it
    pub fn rename_column(&mut self, old: &str, new: &str) {
        if old == new || !self.has_column(old) {
            return;
        }
        for row in &mut self.rows {
            if let Some(value) = row.remove(old) {
                row.replace_or_insert(new, value);
            }
        }
        if self.has_column(new) {
            self.columns.retain(|c| c != old);
        } else if let Some(c) = self.columns.iter_mut().find(|c| *c == old) {
            *c = new.to_string();
        }
    }

    /// Drop rows whose values equal an earlier row in every column.
    ///
    /// Returns the number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let columns = self.columns.clone();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.rows.retain(|row| {
            let key: Vec<String> = columns
                .iter()
                .map(|c| row.get(c).map(ToString::to_string).unwrap_or_default())
                .collect();
            seen.insert(key)
        });
        before - self.rows.len()
    }

    /// Distinct values of a column in order of first appearance
    pub fn distinct(&self, column: &str) -> Vec<Cell> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if let Some(value) = row.get(column) {
                if !seen.contains(value) {
                    seen.push(value.clone());
                }
            }
        }
        seen
    }
}

impl Row {
    fn replace_or_insert(&mut self, key: &str, value: Cell) {
        if let Some(slot) = self.get_mut(key) {
            *slot = value;
        } else {
            self.fields.push((key.to_string(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_insert_replaces_in_place() {
        let mut row = Row::new().with("a", "1").with("b", "2");
        row.insert("a", 3_i64);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&Cell::Int(3)));
    }

    #[test]
    fn test_row_replace_keeps_position() {
        let mut row = Row::new().with("seq id", "NC_001").with("freq", "87.5%").with("gene", "g");
        assert!(row.replace("freq", "freq %", Cell::Float(87.5)));
        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["seq id", "freq %", "gene"]
        );
        assert!(!row.contains("freq"));
        assert!(!row.replace("missing", "x", Cell::Empty));
    }

    #[test]
    fn test_table_column_union_first_seen() {
        let table = Table::from_rows([
            Row::new().with("a", "1").with("b", "2"),
            Row::new().with("c", "3").with("a", "4"),
        ]);
        assert_eq!(table.columns(), ["a", "b", "c"]);
        assert_eq!(table.value(1, "b"), &Cell::Empty);
        assert_eq!(table.value(1, "c"), &Cell::text("3"));
    }

    #[test]
    fn test_drop_duplicates() {
        let mut table = Table::from_rows([
            Row::new().with("id", "s1").with("n", 1_i64),
            Row::new().with("id", "s1").with("n", 1_i64),
            Row::new().with("id", "s1").with("n", 2_i64),
        ]);
        assert_eq!(table.drop_duplicates(), 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rename_column() {
        let mut table = Table::from_rows([Row::new().with("Sample_ID", "s1").with("x", "1")]);
        table.rename_column("Sample_ID", "sampleId");
        assert_eq!(table.columns(), ["sampleId", "x"]);
        assert_eq!(table.value(0, "sampleId"), &Cell::text("s1"));
    }

    #[test]
    fn test_cell_infer() {
        assert_eq!(Cell::infer("12"), Cell::Int(12));
        assert_eq!(Cell::infer("87.5"), Cell::Float(87.5));
        assert_eq!(Cell::infer("  "), Cell::Empty);
        assert_eq!(Cell::infer("NC_001"), Cell::text("NC_001"));
        assert_eq!(Cell::infer("NaN"), Cell::text("NaN"));
    }
}
