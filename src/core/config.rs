//! JSON configuration files.
//!
//! Lookup tables that used to be hard-coded (tree colours, SampleSheet column
//! names) are loaded from small JSON documents instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid colour '{color}' for value '{value}': expected #RRGGBB")]
    InvalidColor { value: String, color: String },
}

/// Colours for tree leaves, keyed by the value of one annotation column.
///
/// ```json
/// { "column": "PatientID", "colors": { "273": "#1d91c0", "653": "#225ea8" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorMap {
    /// Annotation column whose value selects the colour
    pub column: String,
    /// Column value -> `#RRGGBB`
    pub colors: BTreeMap<String, String>,
}

impl ColorMap {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let map: Self = serde_json::from_str(json)?;
        for (value, color) in &map.colors {
            if !is_hex_color(color) {
                return Err(ConfigError::InvalidColor {
                    value: value.clone(),
                    color: color.clone(),
                });
            }
        }
        Ok(map)
    }

    pub fn color_for(&self, value: &str) -> Option<&str> {
        self.colors.get(value.trim()).map(String::as_str)
    }
}

fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// SampleSheet column renaming: sequencer column name -> output column name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMap(pub BTreeMap<String, String>);

impl Default for ColumnMap {
    fn default() -> Self {
        let pairs = [
            ("I5_Index_ID", "i5IndexId"),
            ("I7_Index_ID", "i7IndexId"),
            ("Index_ID", "indexId"),
            ("Name", "sampleName"),
            ("NucleicAcid", "nucleicAcid"),
            ("Pop", "pop"),
            ("Project", "projectName"),
            ("SampleID", "sampleId"),
            ("Sample_ID", "sampleId"),
            ("Sample_Name", "sampleName"),
            ("Sample_Well", "sampleWell"),
            ("Species", "species"),
            ("Well", "sampleWell"),
            ("index", "index"),
            ("index2", "index2"),
        ];
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl ColumnMap {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Output name for a sequencer column; unknown columns keep their name
    pub fn rename<'a>(&'a self, column: &'a str) -> &'a str {
        self.0.get(column).map_or(column, String::as_str)
    }
}
