//! Output writers for call trees.
//!
//! This module handles rendering trees and writing them to disk:
//! - Graphviz dot graphs
//! - JSON profiles
//! - SVG flamegraphs

pub mod dot;
pub mod json;
pub mod schema;
pub mod svg;

// Re-export main functions
pub use dot::{build_dot, build_dot_with, DefaultStyler, NodeStyler};
pub use json::{profile_to_string, read_profile, write_profile};
pub use schema::{to_profile, CallSiteProfile, FunctionProfile, Profile, ProfileNode, TimeSummary};
pub use svg::{write_svg, write_text};
