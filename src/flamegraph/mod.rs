//! Flamegraph generation using the inferno library.
//!
//! This module converts call trees into interactive SVG flamegraphs.
//! Flamegraphs show at a glance where the profiled run spent its time.

pub mod generator;

// Re-export main types
pub use generator::{
    generate_flamegraph, generate_text_summary, render_stacks, FlamegraphConfig,
};
