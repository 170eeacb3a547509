//! Table writers for delimited text and Excel workbooks.

pub mod delimited;
pub mod workbook;
