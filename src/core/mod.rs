//! Core data types shared by every tool.
//!
//! - [`table`]: [`Cell`](table::Cell), [`Row`](table::Row) and
//!   [`Table`](table::Table), the in-memory form of every report and sheet
//! - [`coerce`]: Numeric coercion of report text such as `1,234` and `87.5%`
//! - [`config`]: JSON configuration files (colour maps, column maps)

pub mod coerce;
pub mod config;
pub mod table;
