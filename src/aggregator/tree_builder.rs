//! Reconstruct a call tree from raw cachegrind entries.
//!
//! xdebug writes a call only when it returns, so a caller's entry comes
//! after the entries of everything it called. Walking the entries backwards
//! therefore meets every caller before its callees. Each entry declares how
//! many calls it made, which gives the number of child slots to fill; slots
//! are filled from the last one backwards because callees are met in reverse
//! call order.
//!
//! Example (file order):
//! ```text
//! baz            <- 0 calls
//! bar  cfn=baz   <- 1 call
//! qux            <- 0 calls
//! foo  cfn=bar cfn=qux
//! ```
//! Reversed: foo (2 slots), qux fills foo's slot 1, bar fills slot 0, baz
//! fills bar's only slot.

use super::call_tree::CallTree;
use super::node::{AggregatedCall, CallKey, NodeId};
use crate::parser::RawEntry;
use crate::utils::error::TreeError;
use log::debug;

/// A node still waiting for callees
struct Frame {
    node: NodeId,
    /// Unfilled child slots; `None` for the root, which takes any number
    remaining: Option<usize>,
}

/// Build a call tree from entries in file order
///
/// **Public** - main entry point for tree reconstruction
///
/// # Algorithm
/// 1. Start with a root frame that accepts any number of children
/// 2. Walk entries from last to first, creating one node per entry
/// 3. Put the node into the stack top's last free slot (or after the root's
///    children) and push it with one slot per declared sub-call
/// 4. Pop every frame whose slots are all filled
///
/// Each node is pushed and popped once, so the pass is linear.
///
/// The root always records one call, even for an empty file, so its
/// `call_count()` is 1 while every tree-wide statistic stays 0.
///
/// # Errors
/// * `TreeError::UnresolvedCalls` - entries declare more sub-calls than the
///   file contains entries for
/// * `TreeError::TimeOverflow` - an entry or the whole run sums to more
///   than `u64::MAX`
pub fn build_call_tree(entries: &[RawEntry]) -> Result<CallTree, TreeError> {
    debug!("Building call tree from {} entries", entries.len());

    let mut tree = CallTree::new();
    let mut stack = vec![Frame {
        node: tree.root(),
        remaining: None,
    }];
    // collected back to front, reversed once at the end
    let mut top_level: Vec<NodeId> = Vec::new();
    let mut max_self_time = 0;

    for entry in entries.iter().rev() {
        max_self_time = max_self_time.max(entry.self_time);

        let key = Some(CallKey::new(entry.file, entry.function));
        let mut node = AggregatedCall::new(key);
        let inclusive_time = entry.inclusive_time().ok_or(TreeError::TimeOverflow)?;
        node.add_call(key, entry.self_time, inclusive_time);
        node.children = vec![NodeId::UNSET; entry.calls.len()];
        let id = tree.push_node(node);

        match stack.last_mut() {
            Some(Frame {
                node: parent,
                remaining: Some(remaining),
            }) => {
                *remaining -= 1;
                tree.node_mut(*parent).children[*remaining] = id;
            }
            _ => top_level.push(id),
        }

        stack.push(Frame {
            node: id,
            remaining: Some(entry.calls.len()),
        });

        while stack
            .last()
            .is_some_and(|frame| frame.remaining == Some(0))
        {
            stack.pop();
        }
    }

    let pending: usize = stack.iter().filter_map(|frame| frame.remaining).sum();
    if pending > 0 {
        return Err(TreeError::UnresolvedCalls { pending });
    }

    top_level.reverse();
    let root_time = top_level
        .iter()
        .try_fold(0u64, |acc, &id| acc.checked_add(tree.node(id).inclusive_time().sum()))
        .ok_or(TreeError::TimeOverflow)?;
    let root = tree.node_mut(tree.root());
    root.children = top_level;
    root.add_call(None, 0, root_time);

    tree.max_self_time = max_self_time;
    tree.max_call_count = u64::from(!entries.is_empty());
    tree.total_call_count = entries.len() as u64;

    debug!(
        "Built call tree: {} nodes, total time {}",
        tree.arena_len(),
        tree.total_time()
    );

    Ok(tree)
}
