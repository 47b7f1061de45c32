//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::parser::fsa::Token;
use thiserror::Error;

/// Errors that can occur while reading a cachegrind file
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read profile: {0}")]
    IoError(#[from] std::io::Error),

    /// A line arrived in a state of the header or body grammar that does not accept it
    #[error("Grammar violation at line {line_no}: {line:?} (token: {})", describe_token(.token))]
    Grammar {
        line_no: usize,
        line: String,
        token: Option<Token>,
    },

    /// A "position time" or summary line did not hold the expected integers
    #[error("Invalid number at line {line_no}: {line:?} (token: {})", describe_token(.token))]
    InvalidNumber {
        line_no: usize,
        line: String,
        token: Option<Token>,
    },
}

impl ParseError {
    /// 1-based line number of the offending line, if the error has one
    pub fn line_no(&self) -> Option<usize> {
        match self {
            Self::IoError(_) => None,
            Self::Grammar { line_no, .. } | Self::InvalidNumber { line_no, .. } => Some(*line_no),
        }
    }
}

fn describe_token(token: &Option<Token>) -> &'static str {
    token.map_or("none", Token::as_str)
}

/// Errors that can occur while reconstructing or reducing a call tree
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("{pending} declared sub-call(s) have no matching entry")]
    UnresolvedCalls { pending: usize },

    /// Summed times from the input exceed `u64::MAX`
    #[error("Time values overflow 64 bits")]
    TimeOverflow,

    #[error("Threshold must be a percentage between 0 and 100, got {0}")]
    InvalidThreshold(f64),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
