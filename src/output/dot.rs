//! Graphviz dot rendering of call trees.
//!
//! Every tree node becomes a dot node whose id is the slash-joined path of
//! 1-based child positions from the root (`-1`), so ids stay unique even when
//! the same function shows up under many parents.

use crate::aggregator::{AggregatedCall, CallTree, NodeId};
use crate::parser::NameTable;
use crate::utils::config::{
    DOT_LABEL_HEAD_CHARS, DOT_LABEL_MAX_CHARS, DOT_LABEL_TAIL_CHARS, TIME_UNITS_PER_MS,
};
use log::debug;
use std::fmt::Write;

const ROOT_ID: &str = "-1";
const EDGE_COLOR: &str = "#AAAAFF";

/// Chooses the fill colour of a node
pub trait NodeStyler {
    fn colorize(&self, node: &AggregatedCall) -> (u8, u8, u8);
}

/// Heat styling: slow nodes lose green, often-called nodes lose blue
#[derive(Debug, Clone, Copy)]
pub struct DefaultStyler {
    max_self_time: u64,
    max_call_count: u64,
}

impl DefaultStyler {
    pub fn new(tree: &CallTree) -> Self {
        Self {
            max_self_time: tree.max_self_time(),
            max_call_count: tree.max_call_count(),
        }
    }
}

impl NodeStyler for DefaultStyler {
    fn colorize(&self, node: &AggregatedCall) -> (u8, u8, u8) {
        let r = 0.8;
        let g = 0.8 - ratio(node.self_time().sum(), self.max_self_time) * 0.8;
        let b = 0.8 - ratio(node.call_count().saturating_sub(1), self.max_call_count) * 0.8;
        (channel(r), channel(g), channel(b))
    }
}

/// `part / whole`, or zero when there is nothing to compare against
fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Shorten long labels to their head and tail
fn trim_label(label: &str) -> String {
    let len = label.chars().count();
    if len <= DOT_LABEL_MAX_CHARS {
        return label.to_string();
    }
    let head: String = label.chars().take(DOT_LABEL_HEAD_CHARS).collect();
    let tail: String = label.chars().skip(len - DOT_LABEL_TAIL_CHARS).collect();
    format!("{head}...{tail}")
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

fn ms(time: u64) -> u64 {
    time / TIME_UNITS_PER_MS
}

/// Render a call tree as a dot digraph using the default styler
///
/// **Public** - main entry point for dot output
pub fn build_dot(tree: &CallTree, names: &NameTable) -> String {
    build_dot_with(tree, names, &DefaultStyler::new(tree))
}

/// Render a call tree as a dot digraph with a custom styler
pub fn build_dot_with(tree: &CallTree, names: &NameTable, styler: &dyn NodeStyler) -> String {
    let total_time = tree.total_time();
    let mut graph = String::new();

    graph.push_str("digraph G { \n");
    graph.push_str("rankdir=TB; \n");
    graph.push_str("edge [labelfontsize=12]; \n");
    graph.push_str("node [shape=box, style=filled]; \n");
    let _ = writeln!(graph, "\"{ROOT_ID}\" [label=\"root\"];");

    // (node, own id, parent id), children pushed in reverse to keep their order
    let mut stack: Vec<(NodeId, String, String)> = Vec::new();
    push_children(&mut stack, tree.root_node().children(), ROOT_ID);
    let mut emitted = 0usize;

    while let Some((id, self_id, parent_id)) = stack.pop() {
        let node = tree.node(id);
        let function = node
            .key()
            .map(|key| trim_label(key.label(names)))
            .unwrap_or_default();
        let function = escape(&function);
        let (r, g, b) = styler.colorize(node);

        let linewidth = if total_time == 0 {
            1.0
        } else {
            6.0 * node.inclusive_time().sum() as f64 / total_time as f64 + 1.0
        };

        let (node_label, edge_label) = if node.call_count() == 1 {
            (
                format!("{}\\n{}ms", function, ms(node.self_time().sum())),
                format!("{}ms", ms(node.inclusive_time().sum())),
            )
        } else {
            let own = node.self_time();
            let inclusive = node.inclusive_time();
            (
                format!(
                    "{}\\n{}x\\[{}ms..{}ms] = {}ms",
                    function,
                    node.call_count(),
                    ms(own.min()),
                    ms(own.max()),
                    ms(own.sum())
                ),
                format!(
                    "{}x\\[{}ms..{}ms] = {}ms",
                    node.call_count(),
                    ms(inclusive.min()),
                    ms(inclusive.max()),
                    ms(inclusive.sum())
                ),
            )
        };

        let _ = writeln!(
            graph,
            "\"{self_id}\" [label=\"{node_label}\" color=\"#{r:02x}{g:02x}{b:02x}\"]; "
        );
        let _ = writeln!(
            graph,
            "\"{parent_id}\" -> \"{self_id}\" [label=\"{edge_label}\" style=\"setlinewidth({linewidth:.3})\" color=\"{EDGE_COLOR}\"]; "
        );
        emitted += 1;

        push_children(&mut stack, node.children(), &self_id);
    }

    graph.push_str("} \n");

    debug!("Rendered dot graph with {} nodes below root", emitted);

    graph
}

fn push_children(stack: &mut Vec<(NodeId, String, String)>, children: &[NodeId], parent_id: &str) {
    for (pos, &child) in children.iter().enumerate().rev() {
        stack.push((child, format!("{parent_id}/{}", pos + 1), parent_id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_call_tree;
    use crate::parser::{RawCall, RawEntry};
    use pretty_assertions::assert_eq;

    fn sample(names: &mut NameTable) -> CallTree {
        let file = names.intern_file("/srv/app.php");
        let main = names.intern_function("{main}");
        let strlen = names.intern_function("php::strlen");

        let mut a = RawEntry::new(file, strlen);
        a.self_time = 2_000;
        let mut b = RawEntry::new(file, strlen);
        b.self_time = 6_000;
        let mut root = RawEntry::new(file, main);
        root.self_time = 12_000;
        root.calls = vec![
            RawCall { function: strlen, position: 3, inclusive_time: 2_000 },
            RawCall { function: strlen, position: 4, inclusive_time: 6_000 },
        ];
        build_call_tree(&[a, b, root]).unwrap()
    }

    #[test]
    fn test_trim_label() {
        assert_eq!(trim_label("short"), "short");
        let long = "Illuminate\\Foundation\\Application->bootstrapWith";
        assert_eq!(trim_label(long), "Illuminate\\F...->bootstrapWith");
        assert_eq!(trim_label(long).chars().count(), 30);
    }

    #[test]
    fn test_default_styler_handles_empty_tree() {
        let tree = CallTree::new();
        let styler = DefaultStyler::new(&tree);
        assert_eq!(styler.colorize(tree.root_node()), (204, 204, 204));
    }

    #[test]
    fn test_dot_output() {
        let mut names = NameTable::new();
        let tree = sample(&mut names);
        let dot = build_dot(&tree, &names);

        let expected = concat!(
            "digraph G { \n",
            "rankdir=TB; \n",
            "edge [labelfontsize=12]; \n",
            "node [shape=box, style=filled]; \n",
            "\"-1\" [label=\"root\"];\n",
            "\"-1/1\" [label=\"{main}\\n12ms\" color=\"#cc00cc\"]; \n",
            "\"-1\" -> \"-1/1\" [label=\"20ms\" style=\"setlinewidth(7.000)\" color=\"#AAAAFF\"]; \n",
            "\"-1/1/1\" [label=\"strlen\\n2ms\" color=\"#ccaacc\"]; \n",
            "\"-1/1\" -> \"-1/1/1\" [label=\"2ms\" style=\"setlinewidth(1.600)\" color=\"#AAAAFF\"]; \n",
            "\"-1/1/2\" [label=\"strlen\\n6ms\" color=\"#cc66cc\"]; \n",
            "\"-1/1\" -> \"-1/1/2\" [label=\"6ms\" style=\"setlinewidth(2.800)\" color=\"#AAAAFF\"]; \n",
            "} \n",
        );
        assert_eq!(dot, expected);
    }

    #[test]
    fn test_multi_call_labels() {
        let mut names = NameTable::new();
        let tree = crate::aggregator::aggregate_call_paths(&sample(&mut names));
        let dot = build_dot(&tree, &names);
        assert!(dot.contains("strlen\\n2x\\[2ms..6ms] = 8ms"));
        assert!(dot.contains("[label=\"2x\\[2ms..6ms] = 8ms\""));
    }
}
