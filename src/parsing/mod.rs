//! Parsers for the inputs of the workflow.
//!
//! - **breseq reports**: Mutation, coverage and junction tables from `index.html`
//! - **Spreadsheets**: CSV, TSV and Excel workbooks
//! - **Sample sheets**: The `[Data]` section of Illumina `SampleSheet.csv` files
//! - **FASTA**: Contig length filtering for plain and gzipped files
//!
//! ## Example
//!
//! ```rust,no_run
//! use bactools::parsing::breseq::parse_report_file;
//! use std::path::Path;
//!
//! let report = parse_report_file("AU1234", Path::new("AU1234/output/index.html")).unwrap();
//! println!("{} mutations", report.mutations.len());
//! ```

pub mod breseq;
pub mod fasta;
pub mod samplesheet;
pub mod tables;
