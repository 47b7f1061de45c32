//! Graph command implementation.
//!
//! The graph command:
//! 1. Parses every input file and rebuilds its call tree
//! 2. Merges the trees, aggregating call paths after each merge
//! 3. Removes fast tails
//! 4. Renders the tree as dot, JSON or an SVG flamegraph

use super::models::{AggregateMode, GraphArgs, OutputFormat};
use crate::aggregator::{aggregate_call_paths, build_call_tree, CallTree, FunctionTable};
use crate::flamegraph::generate_flamegraph;
use crate::output::{build_dot, profile_to_string, to_profile, write_profile, write_svg, write_text};
use crate::parser::{CachegrindParser, NameTable, RawBody};
use crate::utils::error::ParseError;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// A merged tree with the commands of the runs that went into it
#[derive(Debug, Default)]
pub struct MergedTree {
    pub tree: CallTree,
    /// Per-function view over every loaded run
    pub functions: FunctionTable,
    pub commands: Vec<String>,
    /// Inputs that failed and were skipped
    pub skipped: usize,
}

/// Parse one file and rebuild its call tree
///
/// The parsed body is returned alongside the tree for per-function views.
pub fn load_tree(path: &Path, names: &mut NameTable) -> Result<(RawBody, CallTree)> {
    let parser = CachegrindParser::open(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let body = parser
        .get_body(names)
        .map_err(|e| report_parse_error(path, e))?;

    debug!("{}: {} entries", path.display(), body.entries.len());

    let tree = build_call_tree(&body.entries)
        .with_context(|| format!("Failed to rebuild call tree of {}", path.display()))?;
    Ok((body, tree))
}

fn report_parse_error(path: &Path, err: ParseError) -> anyhow::Error {
    warn!("Can't parse file '{}'", path.display());
    if let ParseError::Grammar { line_no, line, token } | ParseError::InvalidNumber { line_no, line, token } = &err {
        warn!("Line no: {}", line_no);
        warn!("Line: {:?}", line);
        warn!("Literal: {}", token.map_or("none", |t| t.as_str()));
    }
    anyhow::Error::new(err).context(format!("Failed to parse {}", path.display()))
}

/// Load and merge every input
///
/// # Errors
/// The first failing input, unless `args.ignore_errors` is set
pub fn build_merged_tree(args: &GraphArgs, names: &mut NameTable) -> Result<MergedTree> {
    let mut merged = MergedTree::default();

    for path in &args.inputs {
        let (body, tree) = match load_tree(path, names) {
            Ok(loaded) => loaded,
            Err(e) if args.ignore_errors => {
                warn!("Skipping {}: {:#}", path.display(), e);
                merged.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        merged.tree.merge(tree);
        merged.functions.add_entries(&body.entries);
        merged.commands.push(body.header.cmd);
        if args.aggregate == AggregateMode::FuncFile {
            merged.tree = aggregate_call_paths(&merged.tree);
        }
    }

    info!(
        "Merged {} run(s): {} nodes, {} calls, {} functions",
        merged.commands.len(),
        merged.tree.node_count(),
        merged.tree.total_call_count(),
        merged.functions.len()
    );

    Ok(merged)
}

/// Render a tree in the requested format
pub fn render(merged: &MergedTree, names: &NameTable, args: &GraphArgs) -> Result<String> {
    let tree = &merged.tree;
    let rendered = match args.format {
        OutputFormat::Dot => build_dot(tree, names),
        OutputFormat::Json => {
            let profile = to_profile(tree, &merged.functions, names, merged.commands.clone());
            profile_to_string(&profile).context("Failed to serialize profile")?
        }
        OutputFormat::Svg => generate_flamegraph(tree, names, args.flamegraph_config.as_ref())
            .context("Failed to generate flamegraph")?,
    };
    Ok(rendered)
}

/// Execute the graph command
///
/// **Public** - main entry point called from main.rs
pub fn execute_graph(args: GraphArgs) -> Result<()> {
    let start_time = Instant::now();
    info!("Building call graph from {} file(s)", args.inputs.len());

    let mut names = NameTable::new();
    let mut merged = build_merged_tree(&args, &mut names)?;
    if merged.skipped > 0 {
        warn!("{} file(s) were skipped", merged.skipped);
    }

    let removed = merged
        .tree
        .filter_inclusive_time(args.threshold)
        .context("Failed to filter call tree")?;
    debug!("Threshold {}% removed {} subtrees", args.threshold, removed);

    match &args.output {
        Some(path) => match args.format {
            OutputFormat::Json => {
                let MergedTree { tree, functions, commands, .. } = merged;
                write_profile(&to_profile(&tree, &functions, &names, commands), path)
                    .context("Failed to write profile JSON")?;
            }
            OutputFormat::Svg => {
                let svg = render(&merged, &names, &args)?;
                write_svg(&svg, path).context("Failed to write flamegraph SVG")?;
            }
            OutputFormat::Dot => {
                let dot = render(&merged, &names, &args)?;
                write_text(&dot, path).context("Failed to write dot graph")?;
            }
        },
        None => {
            let rendered = render(&merged, &names, &args)?;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush()?;
        }
    }

    info!(
        "Graph completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Validate graph arguments
///
/// **Public** - can be called before execute_graph for early validation
pub fn validate_args(args: &GraphArgs) -> Result<()> {
    if args.inputs.is_empty() {
        anyhow::bail!("At least one input file is required");
    }

    if !(0.0..=100.0).contains(&args.threshold) {
        anyhow::bail!("Threshold must be between 0 and 100, got {}", args.threshold);
    }

    if let Some(config) = &args.flamegraph_config {
        if config.width == 0 {
            anyhow::bail!("Flamegraph width must be greater than 0");
        }
    }

    Ok(())
}
