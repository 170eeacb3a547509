//! Centralized path validation and naming helpers.

use std::path::{Path, PathBuf};

/// Path validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("This is not a valid folder: {0}")]
    NotADirectory(PathBuf),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Output path has no file name: {0}")]
    NoFileName(PathBuf),
}

/// Check that `path` exists and is a directory
///
/// # Errors
///
/// Returns `ValidationError::NotADirectory` otherwise.
pub fn validate_input_directory(path: &Path) -> Result<(), ValidationError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ValidationError::NotADirectory(path.to_path_buf()))
    }
}

/// Check that `path` is an existing file
///
/// # Errors
///
/// Returns `ValidationError::FileNotFound` otherwise.
pub fn validate_input_file(path: &Path) -> Result<(), ValidationError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ValidationError::FileNotFound(path.to_path_buf()))
    }
}

/// Resolve an output base path: an existing directory gets `default_name` appended.
#[must_use]
pub fn resolve_output_base(path: &Path, default_name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(default_name)
    } else {
        path.to_path_buf()
    }
}

/// Sibling of `base` named `<stem>.<kind>.<extension>`.
///
/// # Examples
///
/// ```
/// use bactools::utils::validation::suffixed_path;
/// use std::path::{Path, PathBuf};
///
/// let path = suffixed_path(Path::new("out/breseq_output"), "snp", "csv").unwrap();
/// assert_eq!(path, PathBuf::from("out/breseq_output.snp.csv"));
/// ```
///
/// # Errors
///
/// Returns `ValidationError::NoFileName` if `base` has no file name.
pub fn suffixed_path(base: &Path, kind: &str, extension: &str) -> Result<PathBuf, ValidationError> {
    let stem = base
        .file_stem()
        .ok_or_else(|| ValidationError::NoFileName(base.to_path_buf()))?
        .to_string_lossy();
    Ok(base.with_file_name(format!("{stem}.{kind}.{extension}")))
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}
