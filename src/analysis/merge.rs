//! Inner join of two tables on a shared column.

use std::collections::HashMap;

use crate::core::table::{Row, Table};
use crate::parsing::tables::TableError;

/// Suffixes appended to overlapping non-key columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffixes {
    pub left: String,
    pub right: String,
}

impl Suffixes {
    /// Pick suffixes that say where each column came from: the sheet names
    /// when they differ, else the file names when they differ, else `_x`/`_y`.
    #[must_use]
    pub fn describe(left_file: &str, right_file: &str, left_sheet: &str, right_sheet: &str) -> Self {
        let (left, right) = if left_sheet != right_sheet {
            (left_sheet, right_sheet)
        } else if left_file != right_file {
            (left_file, right_file)
        } else {
            ("x", "y")
        };
        Self {
            left: format!("_{left}"),
            right: format!("_{right}"),
        }
    }
}

impl Default for Suffixes {
    fn default() -> Self {
        Self {
            left: "_x".to_string(),
            right: "_y".to_string(),
        }
    }
}

/// Join `left` and `right` where their `on` values are equal
///
/// Output rows follow `left` order; each left row is repeated once per
/// matching right row, in `right` order. Rows with a blank key never match.
/// The key column appears once; other columns present in both tables get
/// `suffixes`.
///
/// # Errors
///
/// Returns `TableError::MissingColumn` if either table lacks `on`.
pub fn merge_tables(
    left: &Table,
    right: &Table,
    on: &str,
    suffixes: &Suffixes,
) -> Result<Table, TableError> {
    for table in [left, right] {
        if !table.has_column(on) {
            return Err(TableError::MissingColumn(on.to_string()));
        }
    }

    let left_name = |column: &str| -> String {
        if column != on && right.has_column(column) {
            format!("{column}{}", suffixes.left)
        } else {
            column.to_string()
        }
    };
    let right_name = |column: &str| -> String {
        if left.has_column(column) {
            format!("{column}{}", suffixes.right)
        } else {
            column.to_string()
        }
    };

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for i in 0..right.len() {
        let key = right.value(i, on);
        if !key.is_empty() {
            index.entry(key.to_string()).or_default().push(i);
        }
    }

    let mut merged = Table::with_columns(
        left.columns()
            .iter()
            .map(|c| left_name(c))
            .chain(
                right
                    .columns()
                    .iter()
                    .filter(|c| *c != on)
                    .map(|c| right_name(c)),
            ),
    );

    for i in 0..left.len() {
        let key = left.value(i, on);
        if key.is_empty() {
            continue;
        }
        let Some(matches) = index.get(&key.to_string()) else {
            continue;
        };
        for &j in matches {
            let mut row = Row::new();
            for column in left.columns() {
                row.insert(left_name(column), left.value(i, column).clone());
            }
            for column in right.columns().iter().filter(|c| *c != on) {
                row.insert(right_name(column), right.value(j, column).clone());
            }
            merged.push(row);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::Cell;

    fn genes(values: &[(&str, i64)]) -> Table {
        Table::from_rows(
            values
                .iter()
                .map(|(g, v)| Row::new().with("Gene_symbol", *g).with("log2fc", *v)),
        )
    }

    #[test]
    fn test_suffix_choice() {
        assert_eq!(
            Suffixes::describe("a.xlsx", "a.xlsx", "WT", "A106P"),
            Suffixes {
                left: "_WT".to_string(),
                right: "_A106P".to_string()
            }
        );
        assert_eq!(
            Suffixes::describe("a.csv", "b.csv", "", "").left,
            "_a.csv".to_string()
        );
        assert_eq!(Suffixes::describe("a.csv", "a.csv", "", ""), Suffixes::default());
    }

    #[test]
    fn test_inner_join() {
        let left = genes(&[("dnaA", 1), ("gyrB", 2), ("rpoB", 3)]);
        let right = genes(&[("rpoB", 30), ("dnaA", 10), ("dnaA", 11), ("katG", 40)]);
        let merged = merge_tables(&left, &right, "Gene_symbol", &Suffixes::default()).unwrap();

        assert_eq!(merged.columns(), ["Gene_symbol", "log2fc_x", "log2fc_y"]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.value(0, "Gene_symbol"), &Cell::text("dnaA"));
        assert_eq!(merged.value(0, "log2fc_y"), &Cell::Int(10));
        assert_eq!(merged.value(1, "log2fc_y"), &Cell::Int(11));
        assert_eq!(merged.value(2, "log2fc_x"), &Cell::Int(3));
        assert_eq!(merged.value(2, "log2fc_y"), &Cell::Int(30));
    }

    #[test]
    fn test_non_overlapping_columns_keep_names() {
        let left = Table::from_rows([Row::new().with("id", "s1").with("city", "Philadelphia")]);
        let right = Table::from_rows([Row::new().with("id", "s1").with("group", "A")]);
        let merged = merge_tables(&left, &right, "id", &Suffixes::default()).unwrap();
        assert_eq!(merged.columns(), ["id", "city", "group"]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_missing_key_column() {
        let left = genes(&[("dnaA", 1)]);
        let right = Table::from_rows([Row::new().with("gene", "dnaA")]);
        let result = merge_tables(&left, &right, "Gene_symbol", &Suffixes::default());
        assert!(matches!(result, Err(TableError::MissingColumn(c)) if c == "Gene_symbol"));
    }
}
