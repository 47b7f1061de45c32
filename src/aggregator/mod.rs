//! Call tree reconstruction and reduction.
//!
//! This module transforms parsed cachegrind entries into:
//! - A nested call tree with per-node timing statistics
//! - Merged trees over several profiled runs
//! - Path-aggregated trees (one node per distinct call path)
//! - Filtered trees with fast tails removed
//! - A flat per-function table with callers and callees

pub mod call_tree;
pub mod filter;
pub mod function_table;
pub mod node;
pub mod path_aggregator;
pub mod stack_builder;
pub mod tree_builder;

// Re-export main types and functions
pub use call_tree::{CallTree, Walk, ROOT};
pub use function_table::{build_function_table, CallSite, FunctionSummary, FunctionTable};
pub use node::{AggregatedCall, CallKey, NodeId, TimeStats};
pub use path_aggregator::aggregate_call_paths;
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
pub use tree_builder::build_call_tree;
