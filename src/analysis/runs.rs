//! Combining FASTQ files of samples sequenced across two runs.
//!
//! Demultiplexed run folders hold one gzipped FASTQ per sample and read. When
//! a library is sequenced twice, both runs contain files with the same name.
//! Each pair is concatenated into the output folder; concatenated gzip
//! members form a valid gzip stream, so the files are joined byte for byte.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RunsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Files not present exactly once in each run: {}", .0.join(", "))]
    Unpaired(Vec<String>),
}

/// Matching files from the two runs and where their concatenation goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPair {
    pub first: PathBuf,
    pub second: PathBuf,
    pub output: PathBuf,
}

/// Every `*.gz` file below `folder`, sorted
///
/// # Errors
///
/// Returns `RunsError::Walk` if the folder cannot be traversed.
pub fn find_gz_files(folder: &Path) -> Result<Vec<PathBuf>, RunsError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(|source| RunsError::Walk {
            path: folder.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "gz") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Pair files of `first` and `second` by file name
///
/// Output paths mirror each file's location relative to `first`.
///
/// # Errors
///
/// Returns `RunsError::Unpaired` listing names that are not found exactly
/// once in each run.
pub fn pair_runs(first: &Path, second: &Path, output: &Path) -> Result<Vec<RunPair>, RunsError> {
    let mut by_name: BTreeMap<String, (Vec<PathBuf>, Vec<PathBuf>)> = BTreeMap::new();
    for path in find_gz_files(first)? {
        by_name.entry(file_name(&path)).or_default().0.push(path);
    }
    for path in find_gz_files(second)? {
        by_name.entry(file_name(&path)).or_default().1.push(path);
    }

    let unpaired: Vec<String> = by_name
        .iter()
        .filter(|(_, (a, b))| a.len() != 1 || b.len() != 1)
        .map(|(name, _)| name.clone())
        .collect();
    if !unpaired.is_empty() {
        return Err(RunsError::Unpaired(unpaired));
    }

    Ok(by_name
        .into_values()
        .filter_map(|(mut a, mut b)| {
            let a = a.pop()?;
            let b = b.pop()?;
            let relative = a.strip_prefix(first).unwrap_or(&a).to_path_buf();
            Some(RunPair {
                output: output.join(relative),
                first: a,
                second: b,
            })
        })
        .collect())
}

/// Concatenate `pair.first` then `pair.second` into `pair.output`
///
/// # Errors
///
/// Returns `RunsError::Io` if a file cannot be read or written.
pub fn concatenate(pair: &RunPair) -> Result<u64, RunsError> {
    if let Some(parent) = pair.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(&pair.output)?);
    let mut written = 0;
    for source in [&pair.first, &pair.second] {
        written += io::copy(&mut File::open(source)?, &mut writer)?;
    }
    writer.flush()?;
    debug!("Wrote {} bytes to {}", written, pair.output.display());
    Ok(written)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
