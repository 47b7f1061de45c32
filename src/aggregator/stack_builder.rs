//! Build collapsed stack format from a call tree.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "{main};Router->dispatch;strlen 120"
//! This means: {main} called Router->dispatch which called strlen, spending
//! 120 time units in strlen itself.

use super::call_tree::CallTree;
use crate::parser::NameTable;
use log::debug;
use std::collections::HashMap;

/// A single collapsed stack entry
///
/// **Public** - used by flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (summed self time of the last frame)
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Frame names may not contain the stack separator
fn frame_name(label: &str) -> String {
    label.replace(';', ":")
}

/// Build collapsed stacks from a call tree
///
/// **Public** - main entry point for stack building
///
/// # Algorithm
/// 1. Walk the tree in pre-order, keeping the labels from the root down
/// 2. Emit one stack per node weighted by its summed self time
/// 3. Aggregate by unique stack (sum weights)
///
/// # Returns
/// Stacks sorted by weight, heaviest first
pub fn build_collapsed_stacks(tree: &CallTree, names: &NameTable) -> Vec<CollapsedStack> {
    let mut stack_map: HashMap<String, u64> = HashMap::new();
    let mut path: Vec<String> = Vec::new();

    for (depth, id) in tree.walk() {
        let node = tree.node(id);
        let Some(key) = node.key() else {
            continue;
        };

        path.truncate(depth.saturating_sub(1));
        path.push(frame_name(key.label(names)));

        let weight = stack_map.entry(path.join(";")).or_insert(0);
        *weight = weight.saturating_add(node.self_time().sum());
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tree_builder::build_call_tree;
    use crate::parser::{RawCall, RawEntry};

    #[test]
    fn test_collapsed_stack_to_line() {
        let stack = CollapsedStack::new("main;execute;strlen".to_string(), 1000);
        assert_eq!(stack.to_line(), "main;execute;strlen 1000");
    }

    #[test]
    fn test_stacks_merge_identical_paths() {
        let mut names = NameTable::new();
        let file = names.intern_file("/srv/app.php");
        let main = names.intern_function("{main}");
        let strlen = names.intern_function("php::strlen");

        let mut a = RawEntry::new(file, strlen);
        a.self_time = 3;
        let mut b = RawEntry::new(file, strlen);
        b.self_time = 4;
        let mut root = RawEntry::new(file, main);
        root.self_time = 10;
        root.calls = vec![
            RawCall { function: strlen, position: 2, inclusive_time: 3 },
            RawCall { function: strlen, position: 3, inclusive_time: 4 },
        ];

        let tree = build_call_tree(&[a, b, root]).unwrap();
        let stacks = build_collapsed_stacks(&tree, &names);

        assert_eq!(
            stacks,
            [
                CollapsedStack::new("{main}".to_string(), 10),
                CollapsedStack::new("{main};strlen".to_string(), 7),
            ]
        );
    }
}
