//! Tree pruning.
//!
//! Both filters work in place, top-down, and never look below a node they
//! removed.

use super::call_tree::{CallTree, ROOT};
use super::node::NodeId;
use crate::utils::error::TreeError;
use log::debug;

impl CallTree {
    /// Remove fast tails: subtrees taking less than `percent` of the total time
    ///
    /// A node is kept when its summed inclusive time is at least
    /// `total_time * percent / 100`. A removed node takes its whole subtree
    /// with it, even descendants that would pass on their own. When the total
    /// time is zero the threshold is zero and nothing is removed.
    ///
    /// # Returns
    /// Number of removed subtrees
    ///
    /// # Errors
    /// * `TreeError::InvalidThreshold` - `percent` is NaN or outside 0..=100
    pub fn filter_inclusive_time(&mut self, percent: f64) -> Result<usize, TreeError> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(TreeError::InvalidThreshold(percent));
        }

        let threshold = self.total_time() as f64 * percent / 100.0;
        let mut removed = 0;
        let mut stack = vec![ROOT];

        while let Some(id) = stack.pop() {
            let children = std::mem::take(&mut self.node_mut(id).children);
            let (kept, dropped): (Vec<NodeId>, Vec<NodeId>) = children
                .into_iter()
                .partition(|&child| self.node(child).inclusive_time().sum() as f64 >= threshold);

            removed += dropped.len();
            stack.extend(kept.iter().copied());
            self.node_mut(id).children = kept;
        }

        if removed > 0 {
            self.compact();
        }

        debug!(
            "Inclusive time filter at {}% (threshold {:.0}): removed {} subtrees, {} nodes left",
            percent,
            threshold,
            removed,
            self.arena_len()
        );

        Ok(removed)
    }

    /// Cut the tree below `max_depth`, the root being depth 0
    ///
    /// # Returns
    /// Number of nodes whose children were removed
    pub fn filter_depth(&mut self, max_depth: usize) -> usize {
        let cut: Vec<NodeId> = self
            .walk()
            .filter(|&(depth, id)| depth == max_depth && !self.node(id).children().is_empty())
            .map(|(_, id)| id)
            .collect();

        for &id in &cut {
            self.node_mut(id).children.clear();
        }
        if !cut.is_empty() {
            self.compact();
        }

        debug!("Depth filter at {}: cut {} nodes", max_depth, cut.len());
        cut.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tree_builder::build_call_tree;
    use crate::parser::{NameTable, RawCall, RawEntry};

    fn entry(names: &mut NameTable, function: &str, self_time: u64, calls: &[(&str, u64)]) -> RawEntry {
        let mut entry = RawEntry::new(names.intern_file("/srv/app.php"), names.intern_function(function));
        entry.self_time = self_time;
        entry.calls = calls
            .iter()
            .map(|(callee, inclusive)| RawCall {
                function: names.intern_function(callee),
                position: 0,
                inclusive_time: *inclusive,
            })
            .collect();
        entry
    }

    /// Inclusive times: main 100 -> [slow 50 -> inner 45, fast 5 -> inner 4]
    fn sample_tree(names: &mut NameTable) -> CallTree {
        let entries = vec![
            entry(names, "fast_inner", 45, &[]),
            entry(names, "slow", 5, &[("fast_inner", 45)]),
            entry(names, "slow_inner", 4, &[]),
            entry(names, "fast", 1, &[("slow_inner", 4)]),
            entry(names, "{main}", 45, &[("slow", 50), ("fast", 5)]),
        ];
        build_call_tree(&entries).unwrap()
    }

    #[test]
    fn test_filter_removes_fast_tails() {
        let mut names = NameTable::new();
        let mut tree = sample_tree(&mut names);
        assert_eq!(tree.total_time(), 100);

        let removed = tree.filter_inclusive_time(10.0).unwrap();

        // fast (5) goes, and slow_inner with it
        assert_eq!(removed, 1);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_filter_does_not_rescue_descendants() {
        let mut names = NameTable::new();
        let mut tree = sample_tree(&mut names);

        tree.filter_inclusive_time(46.0).unwrap();

        // slow (50) stays, its child (45) is under the threshold
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let mut names = NameTable::new();
        let mut tree = sample_tree(&mut names);
        assert_eq!(tree.filter_inclusive_time(0.0).unwrap(), 0);
        assert_eq!(tree.node_count(), 6);
    }

    #[test]
    fn test_zero_total_time_never_prunes() {
        let mut names = NameTable::new();
        let entries = vec![entry(&mut names, "{main}", 0, &[])];
        let mut tree = build_call_tree(&entries).unwrap();

        assert_eq!(tree.filter_inclusive_time(100.0).unwrap(), 0);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_invalid_threshold() {
        let mut tree = CallTree::new();
        assert!(tree.filter_inclusive_time(-1.0).is_err());
        assert!(tree.filter_inclusive_time(100.5).is_err());
        assert!(tree.filter_inclusive_time(f64::NAN).is_err());
    }

    #[test]
    fn test_raising_threshold_never_adds_nodes() {
        let mut names = NameTable::new();
        let base = sample_tree(&mut names);
        let mut previous = usize::MAX;

        for percent in [0.0, 1.0, 5.0, 10.0, 46.0, 50.0, 90.0, 100.0] {
            let mut tree = base.clone();
            tree.filter_inclusive_time(percent).unwrap();
            assert!(tree.node_count() <= previous);
            previous = tree.node_count();
        }
    }

    #[test]
    fn test_filter_depth() {
        let mut names = NameTable::new();
        let mut tree = sample_tree(&mut names);

        let cut = tree.filter_depth(2);

        // slow and fast lose their children
        assert_eq!(cut, 2);
        assert_eq!(tree.node_count(), 4);

        assert_eq!(tree.filter_depth(0), 1);
        assert_eq!(tree.node_count(), 1);
    }
}
