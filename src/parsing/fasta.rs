//! FASTA contig length filtering using noodles.
//!
//! Assemblers emit many short contigs that only add noise downstream. Records
//! longer than a cutoff are copied to the output; the rest are dropped.
//! Supports both uncompressed and gzip/bgzip compressed input.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use noodles::fasta;
use thiserror::Error;
use tracing::debug;

use crate::utils::validation::is_gzipped;

/// Contigs at or below this many bases are dropped by default
pub const DEFAULT_CUTOFF: usize = 1000;

#[derive(Error, Debug)]
pub enum FastaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No sequences found in FASTA file")]
    Empty,
}

/// Record counts of a filtering pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub kept: usize,
    pub dropped: usize,
}

impl FilterStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.kept + self.dropped
    }
}

/// Copy records of `input` longer than `cutoff` bases to `output`
///
/// # Errors
///
/// Returns `FastaError::Io` if a file cannot be read, parsed or written, or
/// `FastaError::Empty` if `input` holds no records.
pub fn filter_contigs_file(input: &Path, output: &Path, cutoff: usize) -> Result<FilterStats, FastaError> {
    let file = File::open(input)?;
    let mut writer = BufWriter::new(File::create(output)?);
    let stats = if is_gzipped(input) {
        filter_contigs(BufReader::new(GzDecoder::new(file)), &mut writer, cutoff)?
    } else {
        filter_contigs(BufReader::new(file), &mut writer, cutoff)?
    };
    writer.flush()?;
    Ok(stats)
}

/// Filter FASTA records from `reader` into `writer`
///
/// # Errors
///
/// Returns `FastaError::Io` on malformed input or a failed write, or
/// `FastaError::Empty` if the input holds no records.
pub fn filter_contigs<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    cutoff: usize,
) -> Result<FilterStats, FastaError> {
    let mut reader = fasta::io::Reader::new(reader);
    let mut writer = fasta::io::Writer::new(writer);
    let mut stats = FilterStats::default();

    for result in reader.records() {
        let record = result?;
        let length = record.sequence().len();
        if length > cutoff {
            writer.write_record(&record)?;
            stats.kept += 1;
        } else {
            debug!(
                "Dropping {} ({length} bp)",
                String::from_utf8_lossy(record.name())
            );
            stats.dropped += 1;
        }
    }

    if stats.total() == 0 {
        return Err(FastaError::Empty);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Cursor;

    const CONTIGS: &[u8] = b">NODE_1 length=12\nACGTACGT\nACGT\n>NODE_2\nGGGG\n>NODE_3\nACGTAC\n";

    #[test]
    fn test_filter_contigs() {
        let mut out = Vec::new();
        let stats = filter_contigs(Cursor::new(CONTIGS), &mut out, 5).unwrap();
        assert_eq!(stats, FilterStats { kept: 2, dropped: 1 });

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(">NODE_1 length=12\nACGTACGTACGT\n"));
        assert!(text.contains(">NODE_3\nACGTAC\n"));
        assert!(!text.contains("NODE_2"));
    }

    #[test]
    fn test_length_equal_to_cutoff_is_dropped() {
        let mut out = Vec::new();
        let stats = filter_contigs(Cursor::new(CONTIGS), &mut out, 6).unwrap();
        assert_eq!(stats, FilterStats { kept: 1, dropped: 2 });
    }

    #[test]
    fn test_empty_input() {
        let mut out = Vec::new();
        let result = filter_contigs(Cursor::new(b""), &mut out, 5);
        assert!(matches!(result, Err(FastaError::Empty)));
    }

    #[test]
    fn test_filter_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("contigs.fasta.gz");
        let output = dir.path().join("filtered.fasta");

        let mut encoder = GzEncoder::new(File::create(&input).unwrap(), Compression::default());
        encoder.write_all(CONTIGS).unwrap();
        encoder.finish().unwrap();

        let stats = filter_contigs_file(&input, &output, 10).unwrap();
        assert_eq!(stats, FilterStats { kept: 1, dropped: 2 });
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with(">NODE_1"));
    }
}
