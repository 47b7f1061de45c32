//! Split command implementation.
//!
//! xdebug can append several runs to one output file, each run introduced
//! by a separator line. The split command writes every run to its own file
//! next to the input: `cachegrind.out.42` becomes `cachegrind.out.0.42`,
//! `cachegrind.out.1.42`, ...

use crate::output::write_text;
use crate::utils::config::run_separator;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Cut multi-run text into runs
///
/// Returns `None` when the second line is not the run separator. The first
/// line is not part of any run.
pub fn split_runs(source: &str) -> Option<Vec<String>> {
    let separator = run_separator();
    let is_separator = |line: &str| line.trim_end_matches(['\r', '\n']) == separator;

    let mut lines = source.split_inclusive('\n');
    lines.next();
    if !lines.next().is_some_and(is_separator) {
        return None;
    }

    let mut runs = vec![String::new()];
    for line in lines {
        if is_separator(line) {
            runs.push(String::new());
        } else if let Some(run) = runs.last_mut() {
            run.push_str(line);
        }
    }
    Some(runs)
}

/// Name of the i-th run file for an input path
fn run_path(input: &Path, index: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}.{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}.{}", stem, index),
    };
    input.with_file_name(name)
}

/// Split one file; returns the written paths, empty when it holds one run
pub fn split_file(input: &Path) -> Result<Vec<PathBuf>> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let Some(runs) = split_runs(&source) else {
        info!("{}: no run separator, left alone", input.display());
        return Ok(Vec::new());
    };

    let mut written = Vec::with_capacity(runs.len());
    for (index, run) in runs.iter().enumerate() {
        let path = run_path(input, index);
        write_text(run, &path).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote run {} to {}", index, path.display());
        written.push(path);
    }

    info!("{}: split into {} runs", input.display(), written.len());
    Ok(written)
}

/// Execute the split command over every input
pub fn execute_split(inputs: &[PathBuf]) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("At least one input file is required");
    }
    for input in inputs {
        for path in split_file(input)? {
            println!("{}", path.display());
        }
    }
    Ok(())
}
