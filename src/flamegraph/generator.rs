//! SVG flamegraph generation using the inferno library.
//!
//! The call tree is flattened into collapsed stacks (see
//! [`build_collapsed_stacks`]) and handed to inferno, which takes care of
//! layout, colours and the interactive SVG.

use crate::aggregator::{build_collapsed_stacks, CallTree, CollapsedStack};
use crate::parser::NameTable;
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::info;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
    /// Unit shown in tooltips
    pub count_name: String,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "PHP Call Profile".to_string(),
            width: 1200,
            count_name: "µs".to_string(),
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Generate an SVG flamegraph for a call tree
///
/// **Public** - main entry point for flamegraph generation
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - the tree has no calls or no time
/// * `FlamegraphError::IoError` - inferno failed to render
pub fn generate_flamegraph(
    tree: &CallTree,
    names: &NameTable,
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    let stacks = build_collapsed_stacks(tree, names);
    render_stacks(&stacks, config)
}

/// Render already collapsed stacks
pub fn render_stacks(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    let lines: Vec<String> = stacks
        .iter()
        .filter(|stack| stack.weight > 0)
        .map(CollapsedStack::to_line)
        .collect();
    if lines.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", lines.len());

    let mut options = Options::default();
    options.title = config.title;
    options.count_name = config.count_name;
    options.image_width = Some(config.width);

    let mut svg: Vec<u8> = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(std::io::Error::other)?;

    let svg = String::from_utf8_lossy(&svg).into_owned();
    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

/// Plain-text table of the heaviest stacks
pub fn generate_text_summary(stacks: &[CollapsedStack], max_lines: usize, total_time: u64) -> String {
    let total = total_time.max(1);
    let mut lines = vec![format!("  {:<60} {:>12} {:>7}", "Call path (hottest first)", "SELF", "%")];

    for stack in stacks.iter().take(max_lines) {
        let percentage = (stack.weight as f64 / total as f64) * 100.0;
        let char_count = stack.stack.chars().count();
        let display_stack = if char_count > 60 {
            let tail: String = stack.stack.chars().skip(char_count - 57).collect();
            format!("...{}", tail)
        } else {
            stack.stack.clone()
        };
        lines.push(format!(
            "  {:<60} {:>12} {:>6.1}%",
            display_stack, stack.weight, percentage
        ));
    }

    if stacks.len() > max_lines {
        lines.push(format!(
            "  (Showing top {} of {} unique paths)",
            max_lines,
            stacks.len()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stacks() -> Vec<CollapsedStack> {
        vec![
            CollapsedStack::new("{main};run".to_string(), 700),
            CollapsedStack::new("{main}".to_string(), 300),
        ]
    }

    #[test]
    fn test_render_stacks_produces_svg() {
        let svg = render_stacks(&sample_stacks(), None).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("run"));
    }

    #[test]
    fn test_empty_stacks_rejected() {
        let zero = vec![CollapsedStack::new("{main}".to_string(), 0)];
        assert!(matches!(
            render_stacks(&zero, None),
            Err(FlamegraphError::EmptyStacks)
        ));
    }

    #[test]
    fn test_text_summary() {
        let summary = generate_text_summary(&sample_stacks(), 1, 1000);
        assert!(summary.contains("{main};run"));
        assert!(summary.contains("70.0%"));
        assert!(summary.contains("Showing top 1 of 2"));
    }
}
