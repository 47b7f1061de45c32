//! Call tree storage and tree-wide statistics.
//!
//! Nodes live in an arena and refer to their children by [`NodeId`]. The
//! root is always the first node of the arena, which keeps merging trees a
//! matter of shifting indices.

use super::node::{AggregatedCall, NodeId};
use log::debug;

/// Id of the root node in every tree
pub const ROOT: NodeId = NodeId(0);

/// A call tree with tree-wide statistics used for styling and filtering
#[derive(Debug, Clone)]
pub struct CallTree {
    nodes: Vec<AggregatedCall>,
    pub(crate) max_self_time: u64,
    pub(crate) max_call_count: u64,
    pub(crate) total_call_count: u64,
}

impl Default for CallTree {
    fn default() -> Self {
        Self {
            nodes: vec![AggregatedCall::root()],
            max_self_time: 0,
            max_call_count: 0,
            total_call_count: 0,
        }
    }
}

impl CallTree {
    /// Empty tree: a root without calls and all statistics zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn root_node(&self) -> &AggregatedCall {
        self.node(ROOT)
    }

    pub fn node(&self, id: NodeId) -> &AggregatedCall {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut AggregatedCall {
        &mut self.nodes[id.0]
    }

    pub(crate) fn push_node(&mut self, node: AggregatedCall) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Largest self time of a single node
    pub fn max_self_time(&self) -> u64 {
        self.max_self_time
    }

    /// Inclusive time of the root, i.e. the whole profiled run(s)
    pub fn total_time(&self) -> u64 {
        self.root_node().inclusive_time().sum()
    }

    /// Largest number of calls merged into a single node
    pub fn max_call_count(&self) -> u64 {
        self.max_call_count
    }

    /// Number of physical calls read from the profile(s)
    pub fn total_call_count(&self) -> u64 {
        self.total_call_count
    }

    /// Number of nodes reachable from the root, root included
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Pre-order traversal yielding `(depth, node)`, the root at depth 0
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![(0, ROOT)],
        }
    }

    /// Merge another tree (e.g. another run) into this one
    ///
    /// Roots are merged and the other root's children are appended after
    /// ours. Nothing is deduplicated; see
    /// [`aggregate_call_paths`](super::aggregate_call_paths) for that.
    pub fn merge(&mut self, other: CallTree) {
        self.max_call_count = self.max_call_count.max(other.max_call_count);
        self.max_self_time = self.max_self_time.max(other.max_self_time);
        self.total_call_count = self.total_call_count.saturating_add(other.total_call_count);

        // other's node i (i >= 1) ends up at offset + i
        let offset = self.nodes.len() - 1;
        let shift = |id: NodeId| NodeId(id.0 + offset);

        let mut incoming = other.nodes.into_iter();
        let Some(other_root) = incoming.next() else {
            return;
        };

        for mut node in incoming {
            for child in &mut node.children {
                *child = shift(*child);
            }
            self.nodes.push(node);
        }

        let root = self.node_mut(ROOT);
        root.merge(&other_root);
        root.children
            .extend(other_root.children.iter().map(|&child| shift(child)));

        debug!(
            "Merged tree: {} nodes, {} total calls",
            self.nodes.len(),
            self.total_call_count
        );
    }

    /// Drop arena slots that are no longer reachable from the root
    pub(crate) fn compact(&mut self) {
        let order: Vec<NodeId> = self.walk().map(|(_, id)| id).collect();
        if order.len() == self.nodes.len() {
            return;
        }

        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.0] = Some(NodeId(new));
        }

        let mut old_nodes: Vec<Option<AggregatedCall>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        for old in order {
            if let Some(mut node) = old_nodes[old.0].take() {
                node.children = node.children.iter().filter_map(|c| remap[c.0]).collect();
                self.nodes.push(node);
            }
        }
    }

    pub(crate) fn arena_len(&self) -> usize {
        self.nodes.len()
    }
}

/// Iterator returned by [`CallTree::walk`]
pub struct Walk<'a> {
    tree: &'a CallTree,
    stack: Vec<(usize, NodeId)>,
}

impl Iterator for Walk<'_> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        let children = self.tree.node(id).children();
        self.stack
            .extend(children.iter().rev().map(|&child| (depth + 1, child)));
        Some((depth, id))
    }
}
