//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod graph;
pub mod models;
pub mod split;
pub mod utils;

// Re-export main command functions
pub use graph::{build_merged_tree, execute_graph, load_tree, validate_args, MergedTree};
pub use models::{AggregateMode, GraphArgs, OutputFormat};
pub use split::{execute_split, split_file, split_runs};
pub use utils::{display_version, function_summary, validate_profile_file};
