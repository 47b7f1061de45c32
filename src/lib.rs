//! xdebug-calltree
//!
//! Call tree reconstruction, aggregation and rendering for xdebug
//! cachegrind profiles.
//!
//! This crate provides the core implementation for the
//! `xdebug-calltree` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! xdebug-calltree graph cachegrind.out.* > calls.dot
//! xdebug-calltree graph -f svg -o flame.svg cachegrind.out.1234
//! ```
//!
//! As a library: parse with [`parser::CachegrindParser`], rebuild the tree
//! with [`aggregator::build_call_tree`], then merge, aggregate and filter it
//! before handing it to one of the [`output`] renderers.

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod utils;
