//! Operations over parsed tables.
//!
//! - [`aggregate`]: Collect breseq reports from a folder of sample folders
//! - [`comparison`]: Matrix of which samples carry each mutation position
//! - [`merge`]: Inner join of two tables on a shared column
//! - [`annotate`]: Relabel tree leaves from an annotation table
//! - [`runs`]: Pair and concatenate FASTQ files from two sequencer runs
//! - [`billing`]: Match sample sheet entries to their sequencing files

pub mod aggregate;
pub mod annotate;
pub mod billing;
pub mod comparison;
pub mod merge;
pub mod runs;
