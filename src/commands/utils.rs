use crate::aggregator::{
    aggregate_call_paths, build_call_tree, build_collapsed_stacks, build_function_table, FunctionTable,
};
use crate::flamegraph::generate_text_summary;
use crate::parser::{CachegrindParser, NameTable};
use crate::utils::config::{FORMAT_VERSION, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::Path;

const TOP_FUNCTIONS: usize = 10;

/// Validate a cachegrind file and print what it holds
pub fn validate_profile_file(file_path: &Path) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let parser = CachegrindParser::open(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    let mut names = NameTable::new();
    let body = parser.get_body(&mut names).context("Invalid cachegrind file")?;
    let tree = build_call_tree(&body.entries).context("Inconsistent call structure")?;
    let aggregated = aggregate_call_paths(&tree);
    let functions = build_function_table(&body.entries);

    println!("✓ Valid cachegrind file");
    println!("  Version: {}", body.header.version);
    println!("  Command: {}", body.header.cmd);
    println!("  Entries: {}", body.entries.len());
    println!("  Files: {}", names.file_count());
    println!("  Functions: {}", names.function_count());
    println!("  Total Time: {}", tree.total_time());
    println!("  Max Self Time: {}", tree.max_self_time());
    println!("  Call Paths: {}", aggregated.node_count() - 1);

    let stacks = build_collapsed_stacks(&aggregated, &names);
    println!("\n{}", generate_text_summary(&stacks, 10, tree.total_time()));
    println!("{}", function_summary(&functions, &names, TOP_FUNCTIONS));

    Ok(())
}

/// Table of the heaviest functions by summed self time
pub fn function_summary(functions: &FunctionTable, names: &NameTable, limit: usize) -> String {
    let mut out = format!("Top {} functions by self time:\n", limit.min(functions.len()));
    out.push_str(&format!(
        "  {:<40} {:>8} {:>12} {:>12} {:>8} {:>8}\n",
        "Function", "Calls", "Self", "Inclusive", "Callers", "Callees"
    ));
    for summary in functions.by_self_time().into_iter().take(limit) {
        out.push_str(&format!(
            "  {:<40} {:>8} {:>12} {:>12} {:>8} {:>8}\n",
            names.clean_label(summary.function),
            summary.invocation_count,
            summary.summed_self_time,
            summary.summed_inclusive_time,
            summary.called_from.len(),
            summary.sub_calls.len()
        ));
    }
    out
}

/// Display version information
pub fn display_version() {
    println!("xdebug-calltree v{}", env!("CARGO_PKG_VERSION"));
    println!("Cachegrind format: v{}", FORMAT_VERSION);
    println!("Profile Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call tree graphs and flamegraphs from xdebug cachegrind profiles.");
}
