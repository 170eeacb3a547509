use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::analysis::annotate::{apply_annotations, build_annotations, itol_colors, LabelTemplate};
use crate::core::config::ColorMap;
use crate::parsing::tables::read_table;
use crate::utils::validation::{suffixed_path, validate_input_file};

#[derive(Args)]
pub struct AnnotateArgs {
    /// Tree file (Newick or treefile) whose leaves are named by sample id
    #[arg(short, long, required = true)]
    pub tree: PathBuf,

    /// Annotation table (.xlsx, .csv or .tsv)
    #[arg(short = 'a', long, required = true)]
    pub table: PathBuf,

    /// Sheet of the annotation workbook. Defaults to the first sheet
    #[arg(long)]
    pub sheet: Option<String>,

    /// Column holding the sample ids found in the tree
    #[arg(short, long, required = true)]
    pub key_column: String,

    /// Label template, e.g. "{PatientID}-{group #}-{CultureDate}"
    #[arg(short, long, required = true)]
    pub label: String,

    /// Regex matching a sample id in the tree, with {key} standing for the id.
    /// Sample ids are matched literally when omitted
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// JSON colour map; writes an iTOL TREE_COLORS file next to the tree
    #[arg(long)]
    pub colors: Option<PathBuf>,

    /// Annotated tree path. Defaults to <tree>.annotated.<ext>
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute annotate-tree subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, the template or pattern is
/// invalid, or the outputs cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AnnotateArgs) -> anyhow::Result<()> {
    validate_input_file(&args.tree)?;

    let tree = std::fs::read_to_string(&args.tree)
        .with_context(|| format!("Failed to read {}", args.tree.display()))?;
    let table = read_table(&args.table, args.sheet.as_deref())
        .with_context(|| format!("Failed to read {}", args.table.display()))?;
    let colors = args
        .colors
        .as_deref()
        .map(ColorMap::load_from_file)
        .transpose()
        .context("Failed to load colour map")?;

    let template = LabelTemplate::parse(&args.label)?;
    let annotations = build_annotations(&table, &args.key_column, &template, colors.as_ref())?;
    info!("Built {} annotations from {}", annotations.len(), args.table.display());

    let annotated = apply_annotations(&tree, &annotations, args.pattern.as_deref())?;
    let output = match &args.output {
        Some(path) => path.clone(),
        None => default_output(&args.tree)?,
    };
    std::fs::write(&output, annotated)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {}", output.display());

    if colors.is_some() {
        let colors_path = args.tree.with_extension("colors.txt");
        std::fs::write(&colors_path, itol_colors(&annotations))
            .with_context(|| format!("Failed to write {}", colors_path.display()))?;
        info!("Wrote {}", colors_path.display());
    }
    Ok(())
}

/// `<stem>.annotated.<ext>` next to the tree; `treefile` when it has no extension
fn default_output(tree: &Path) -> anyhow::Result<PathBuf> {
    let extension = tree
        .extension()
        .map_or_else(|| "treefile".to_string(), |e| e.to_string_lossy().into_owned());
    Ok(suffixed_path(tree, "annotated", &extension)?)
}
