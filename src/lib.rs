//! # bactools
//!
//! Tools for the small steps of a bacterial genomics workflow.
//!
//! The centrepiece is the breseq report parser: breseq writes its results as
//! an HTML page per sample, with tables of predicted mutations, missing
//! coverage regions and new junctions. `bactools` reads those tables from a
//! folder of sample runs, combines them, and builds a matrix of which
//! mutations are unique to a sample and which are shared by all of them.
//!
//! ## Features
//!
//! - **breseq reports**: Mutation, coverage and junction tables with numeric coercion
//! - **Sample comparison**: Unique/shared mutation matrix across samples
//! - **Spreadsheets**: Merge tables on a column, read and write CSV/TSV/xlsx
//! - **Trees**: Relabel leaves from an annotation table, iTOL colour datasets
//! - **Sequencing runs**: Combine FASTQ files across runs, billing reports from sample sheets
//! - **Assemblies**: Filter short contigs from FASTA files
//!
//! ## Example
//!
//! ```rust,no_run
//! use bactools::analysis::aggregate::BreseqCollection;
//! use bactools::analysis::comparison::Comparison;
//! use std::path::Path;
//!
//! let collection = BreseqCollection::collect(Path::new("breseq_runs")).unwrap();
//! println!("{} samples", collection.samples.len());
//!
//! if let Ok(Comparison::Matrix(table)) = collection.comparison() {
//!     println!("{} compared positions", table.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Tables, cells and JSON configuration
//! - [`parsing`]: Parsers for breseq reports, spreadsheets, sample sheets and FASTA
//! - [`analysis`]: Aggregation, comparison, merging, annotation and billing
//! - [`output`]: CSV/TSV and workbook writers
//! - [`cli`]: Command-line interface implementation

pub mod analysis;
pub mod cli;
pub mod core;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use analysis::aggregate::BreseqCollection;
pub use analysis::comparison::{compare_samples, Comparison, ComparisonError};
pub use core::table::{Cell, Row, Table};
pub use parsing::breseq::{parse_report, ReportError, SampleReport};
