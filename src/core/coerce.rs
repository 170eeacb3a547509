//! Text-to-number coercion for report fields.
//!
//! Report cells are free text. Numeric columns are coerced where the text
//! allows it; anything else passes through untouched.

use crate::core::table::Cell;

/// Coerce a possibly thousands-separated integer (`"12,345"`).
///
/// Returns the original text as [`Cell::Text`] when it is not an integer.
///
/// # Examples
///
/// ```
/// use bactools::core::coerce::to_number;
/// use bactools::core::table::Cell;
///
/// assert_eq!(to_number("12,345"), Cell::Int(12345));
/// assert_eq!(to_number("= 3,000"), Cell::text("= 3,000"));
/// ```
#[must_use]
pub fn to_number(s: &str) -> Cell {
    let stripped: String = s.trim().chars().filter(|&c| c != ',').collect();
    stripped
        .parse::<i64>()
        .map_or_else(|_| Cell::text(s), Cell::Int)
}

/// Coerce an existing cell in place with [`to_number`]. Non-text cells are left alone.
pub fn coerce_number(cell: &mut Cell) {
    if let Cell::Text(s) = cell {
        *cell = to_number(s);
    }
}

/// Parse a trailing-`%` frequency such as `"87.5%"` into `87.5`.
#[must_use]
pub fn parse_percent(s: &str) -> Option<f64> {
    s.trim()
        .strip_suffix('%')
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number_thousands() {
        assert_eq!(to_number("12,345"), Cell::Int(12_345));
        assert_eq!(to_number("1,234,567"), Cell::Int(1_234_567));
        assert_eq!(to_number(" 42 "), Cell::Int(42));
    }

    #[test]
    fn test_to_number_passthrough() {
        assert_eq!(to_number("4,000 ="), Cell::text("4,000 ="));
        assert_eq!(to_number("NA"), Cell::text("NA"));
        assert_eq!(to_number(""), Cell::text(""));
    }

    #[test]
    fn test_coerce_number_leaves_numbers() {
        let mut cell = Cell::Float(1.5);
        coerce_number(&mut cell);
        assert_eq!(cell, Cell::Float(1.5));

        let mut cell = Cell::text("2,100");
        coerce_number(&mut cell);
        assert_eq!(cell, Cell::Int(2100));
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("87.5%"), Some(87.5));
        assert_eq!(parse_percent("100%"), Some(100.0));
        assert_eq!(parse_percent("87.5"), None);
        assert_eq!(parse_percent("abc%"), None);
    }
}
