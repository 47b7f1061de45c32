//! Collapse calls that share the same call path.
//!
//! Without aggregation every physical call is its own node, which grows
//! without bound for loops and recursion. Two nodes are merged when the
//! sequence of (file, function) pairs from the root down to them is equal.

use super::call_tree::{CallTree, ROOT};
use super::node::{AggregatedCall, CallKey, NodeId};
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Aggregate a tree so each distinct call path has exactly one node
///
/// **Public** - used by the graph command after each merge
///
/// A path is identified by the aggregated node of its parent path plus the
/// last (file, function) pair; by induction from the root this is the same
/// as keying by the full path, without hashing the whole sequence.
///
/// # Returns
/// A new tree. `total_call_count` is copied from the input; `max_call_count`
/// and `max_self_time` are recomputed over the aggregated nodes.
pub fn aggregate_call_paths(tree: &CallTree) -> CallTree {
    let mut aggregated = CallTree::new();
    aggregated.node_mut(ROOT).merge(tree.root_node());

    let mut paths: HashMap<(NodeId, Option<CallKey>), NodeId> = HashMap::new();
    let mut max_call_count = 0;
    let mut max_self_time = 0;

    // (node in the source tree, aggregated node of its parent path)
    let mut stack: Vec<(NodeId, NodeId)> = tree
        .root_node()
        .children()
        .iter()
        .rev()
        .map(|&child| (child, ROOT))
        .collect();

    while let Some((source_id, parent)) = stack.pop() {
        let source = tree.node(source_id);

        let target = match paths.entry((parent, source.key())) {
            Entry::Occupied(slot) => *slot.get(),
            Entry::Vacant(slot) => {
                let id = aggregated.push_node(AggregatedCall::new(source.key()));
                aggregated.node_mut(parent).children.push(id);
                *slot.insert(id)
            }
        };

        let call = aggregated.node_mut(target);
        call.merge(source);
        max_call_count = max_call_count.max(call.call_count());
        max_self_time = max_self_time.max(call.self_time().sum());

        stack.extend(
            source
                .children()
                .iter()
                .rev()
                .map(|&child| (child, target)),
        );
    }

    aggregated.max_call_count = max_call_count;
    aggregated.max_self_time = max_self_time;
    aggregated.total_call_count = tree.total_call_count();

    debug!(
        "Aggregated {} nodes into {} call paths",
        tree.node_count(),
        aggregated.arena_len()
    );

    aggregated
}
