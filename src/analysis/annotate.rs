//! Relabelling of phylogenetic tree leaves from an annotation table.
//!
//! Tree files (Newick, IQ-TREE `.treefile`) name leaves after sample ids.
//! Each annotation row maps a sample id to a label rendered from a template
//! such as `{PatientID}-{group #}-{CultureDate}`, and optionally to a colour
//! for an iTOL `TREE_COLORS` dataset.

use regex::{NoExpand, Regex};
use thiserror::Error;

use crate::core::config::ColorMap;
use crate::core::table::Table;

/// Placeholder for the escaped sample id inside a match pattern
pub const KEY_PLACEHOLDER: &str = "{key}";

/// Header of an iTOL colour dataset
pub const ITOL_HEADER: &str = "TREE_COLORS\nSEPARATOR TAB\nDATA\n";

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Annotation table has no '{0}' column")]
    MissingColumn(String),

    #[error("Invalid label template '{template}': {message}")]
    Template { template: String, message: String },

    #[error("Invalid match pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Column(String),
}

/// Label template with `{Column}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTemplate {
    parts: Vec<TemplatePart>,
}

impl LabelTemplate {
    /// Parse a template such as `{RepositoryNumber}|{City}`
    ///
    /// # Errors
    ///
    /// Returns `AnnotateError::Template` for an unclosed or empty placeholder.
    pub fn parse(template: &str) -> Result<Self, AnnotateError> {
        let error = |message: &str| AnnotateError::Template {
            template: template.to_string(),
            message: message.to_string(),
        };

        let mut parts = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                parts.push(TemplatePart::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| error("unclosed '{'"))?;
            let column = after[..close].trim();
            if column.is_empty() {
                return Err(error("empty placeholder"));
            }
            parts.push(TemplatePart::Column(column.to_string()));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            parts.push(TemplatePart::Literal(rest.to_string()));
        }
        Ok(Self { parts })
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            TemplatePart::Column(c) => Some(c.as_str()),
            TemplatePart::Literal(_) => None,
        })
    }

    /// Render the label for row `i`; `None` if any placeholder value is blank
    pub fn render(&self, table: &Table, i: usize) -> Option<String> {
        let mut label = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(s) => label.push_str(s),
                TemplatePart::Column(c) => {
                    let value = table.value(i, c);
                    if value.is_empty() {
                        return None;
                    }
                    label.push_str(value.to_string().trim());
                }
            }
        }
        Some(label)
    }
}

/// One sample id → label mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub key: String,
    pub label: String,
    /// Colour and the column value that selected it
    pub color: Option<(String, String)>,
}

/// Build annotations from every row with a key and a complete label
///
/// # Errors
///
/// Returns `AnnotateError::MissingColumn` if the key, a template column, or
/// the colour column is absent from `table`.
pub fn build_annotations(
    table: &Table,
    key_column: &str,
    template: &LabelTemplate,
    colors: Option<&ColorMap>,
) -> Result<Vec<Annotation>, AnnotateError> {
    let required = std::iter::once(key_column)
        .chain(template.columns())
        .chain(colors.map(|c| c.column.as_str()));
    for column in required {
        if !table.has_column(column) {
            return Err(AnnotateError::MissingColumn(column.to_string()));
        }
    }

    let mut annotations = Vec::new();
    for i in 0..table.len() {
        let key = table.value(i, key_column);
        if key.is_empty() {
            continue;
        }
        let Some(label) = template.render(table, i) else {
            continue;
        };
        let color = colors.and_then(|map| {
            let value = table.value(i, &map.column).to_string();
            map.color_for(&value)
                .map(|color| (color.to_string(), value.trim().to_string()))
        });
        annotations.push(Annotation {
            key: key.to_string().trim().to_string(),
            label,
            color,
        });
    }
    Ok(annotations)
}

/// Replace every sample id in `tree` with its label
///
/// Without a pattern each key is matched literally. A pattern is a regex
/// template where `{key}` stands for the escaped key, e.g. `{key}_S\d+` to
/// also consume an Illumina sample-number suffix.
///
/// # Errors
///
/// Returns `AnnotateError::Pattern` if the expanded pattern is not a valid regex.
pub fn apply_annotations(
    tree: &str,
    annotations: &[Annotation],
    pattern: Option<&str>,
) -> Result<String, AnnotateError> {
    let mut contents = tree.to_string();
    for annotation in annotations {
        contents = match pattern {
            Some(pattern) => {
                let regex = Regex::new(&pattern.replace(KEY_PLACEHOLDER, &regex::escape(&annotation.key)))?;
                regex
                    .replace_all(&contents, NoExpand(&annotation.label))
                    .into_owned()
            }
            None => contents.replace(&annotation.key, &annotation.label),
        };
    }
    Ok(contents)
}

/// Render an iTOL `TREE_COLORS` dataset colouring the range of each labelled leaf
#[must_use]
pub fn itol_colors(annotations: &[Annotation]) -> String {
    let lines: Vec<String> = annotations
        .iter()
        .filter_map(|a| {
            a.color
                .as_ref()
                .map(|(color, value)| format!("{}\trange\t{color}\t{value}", a.label))
        })
        .collect();
    format!("{ITOL_HEADER}{}", lines.join("\n"))
}
