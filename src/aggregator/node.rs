//! Aggregated call nodes.
//!
//! An [`AggregatedCall`] holds statistics about one or more calls of the same
//! function defined in the same file, without keeping the individual calls.

use crate::parser::{FileName, FunctionName, NameTable};

/// Identity of a call: the function and the file it is defined in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallKey {
    pub file: FileName,
    pub function: FunctionName,
}

impl CallKey {
    pub fn new(file: FileName, function: FunctionName) -> Self {
        Self { file, function }
    }

    /// Display label: the clean function name, or the included file
    pub fn label<'a>(&self, names: &'a NameTable) -> &'a str {
        names.clean_label(self.function)
    }
}

/// Index of a node inside its [`CallTree`](super::CallTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Placeholder for a child slot the tree builder has not filled yet
    pub(crate) const UNSET: NodeId = NodeId(usize::MAX);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Min/max/sum accumulator over a series of times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeStats {
    min: Option<u64>,
    max: u64,
    sum: u64,
}

impl TimeStats {
    /// Smallest value seen, 0 when nothing was added
    pub fn min(&self) -> u64 {
        self.min.unwrap_or(0)
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    fn absorb(&mut self, other: &TimeStats) {
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = self.max.max(other.max);
        self.sum = self.sum.saturating_add(other.sum);
    }

    fn single(time: u64) -> Self {
        Self {
            min: Some(time),
            max: time,
            sum: time,
        }
    }
}

/// A tree node holding statistics for every call merged into it
///
/// The identity key is fixed at construction; only calls with the same key
/// can be added or merged. The root of a tree carries no key.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCall {
    key: Option<CallKey>,
    pub(crate) children: Vec<NodeId>,
    call_count: u64,
    self_time: TimeStats,
    inclusive_time: TimeStats,
}

impl AggregatedCall {
    /// Empty accumulator: `call_count` 0, merging it anywhere is a no-op
    pub fn new(key: Option<CallKey>) -> Self {
        Self {
            key,
            children: Vec::new(),
            call_count: 0,
            self_time: TimeStats::default(),
            inclusive_time: TimeStats::default(),
        }
    }

    pub fn root() -> Self {
        Self::new(None)
    }

    pub fn key(&self) -> Option<CallKey> {
        self.key
    }

    pub fn file(&self) -> Option<FileName> {
        self.key.map(|k| k.file)
    }

    pub fn function(&self) -> Option<FunctionName> {
        self.key.map(|k| k.function)
    }

    pub fn is_root(&self) -> bool {
        self.key.is_none()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    pub fn self_time(&self) -> &TimeStats {
        &self.self_time
    }

    pub fn inclusive_time(&self) -> &TimeStats {
        &self.inclusive_time
    }

    /// Add a single occurrence of the call; children are not touched
    ///
    /// # Panics
    /// If `key` differs from the node's own key.
    pub fn add_call(&mut self, key: Option<CallKey>, self_time: u64, inclusive_time: u64) {
        self.absorb(
            key,
            1,
            &TimeStats::single(self_time),
            &TimeStats::single(inclusive_time),
        );
    }

    /// Merge another node's statistics into this one; children are not touched
    ///
    /// # Panics
    /// If `other` has calls and a different key. Mixing identities means the
    /// tree builder or aggregator is broken, not that the input is bad.
    pub fn merge(&mut self, other: &AggregatedCall) {
        if other.call_count == 0 {
            return;
        }
        self.absorb(
            other.key,
            other.call_count,
            &other.self_time,
            &other.inclusive_time,
        );
    }

    fn absorb(
        &mut self,
        key: Option<CallKey>,
        call_count: u64,
        self_time: &TimeStats,
        inclusive_time: &TimeStats,
    ) {
        assert_eq!(
            self.key, key,
            "merged calls must share the same file and function"
        );
        self.call_count = self.call_count.saturating_add(call_count);
        self.self_time.absorb(self_time);
        self.inclusive_time.absorb(inclusive_time);
    }
}
