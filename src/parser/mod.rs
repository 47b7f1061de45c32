//! Cachegrind parsing.
//!
//! This module handles:
//! - Interning file and function names
//! - Validating the header and body grammars
//! - Producing flat raw records in file order

pub mod fsa;
pub mod names;
pub mod raw;

// Re-export main types
pub use fsa::{CachegrindParser, Token};
pub use names::{CleanName, FileName, FunctionKind, FunctionName, NameTable};
pub use raw::{RawBody, RawCall, RawEntry, RawHeader};
