//! Finite-state grammar for xdebug cachegrind files.
//!
//! Lines are classified into [`Token`]s and fed through two transition
//! tables, one for the header block and one for the body. Both tables are
//! total: a token that has no transition out of the current state is a
//! grammar violation, and the whole parse fails with the offending line.
//!
//! Supported files are limited to what xdebug 2.0 writes with
//! `xdebug.profiler_append=0`: format version 0.9.6, one part, one `Time`
//! event.

use super::names::{FileName, FunctionName, NameTable};
use super::raw::{RawBody, RawCall, RawEntry, RawHeader};
use crate::utils::config::{FORMAT_EVENTS, FORMAT_PART, FORMAT_VERSION};
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::collections::HashMap;
use std::iter;
use std::path::Path;

const VERSION_PREFIX: &str = "version: ";
const CMD_PREFIX: &str = "cmd: ";
const PART_PREFIX: &str = "part: ";
const EVENTS_PREFIX: &str = "events: ";
const FILE_PREFIX: &str = "fl=";
const FUNCTION_PREFIX: &str = "fn=";
const CALL_TARGET_PREFIX: &str = "cfn=";
const CALLS_PREFIX: &str = "calls=";
const SUMMARY_PREFIX: &str = "summary: ";

/// Classification of a single non-blank line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// `version: 0.9.6`
    Version,
    /// `cmd: <script>`
    Cmd,
    /// `part: 1`
    Part,
    /// `events: Time`
    Events,
    /// Any other line before the first entry, as seen by the body pass
    HeaderLine,
    /// `fl=<file>`
    File,
    /// `fn=<function>`
    Function,
    /// `<position> <time>`
    Cost,
    /// `cfn=<function>`
    CallTarget,
    /// `calls=<count> <target position> <extra>`
    Calls,
    /// `summary: <total>`
    Summary,
    /// End of input
    Eof,
}

impl Token {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Cmd => "cmd",
            Self::Part => "part",
            Self::Events => "events",
            Self::HeaderLine => "header line",
            Self::File => "fl",
            Self::Function => "fn",
            Self::Cost => "position/time",
            Self::CallTarget => "cfn",
            Self::Calls => "calls",
            Self::Summary => "summary",
            Self::Eof => "eof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderState {
    Start,
    ExpectCmd,
    ExpectPart,
    ExpectEvents,
    ExpectBody,
    Accept,
    Error,
}

/// Rows: version, cmd, part, events, fl, eof. Columns: the five live states.
const HEADER_FSM: [[HeaderState; 5]; 6] = {
    use HeaderState::{Accept as A, Error as X, ExpectCmd, ExpectEvents, ExpectPart};
    [
        [ExpectCmd, X, X, X, X],
        [X, ExpectPart, X, X, X],
        [X, X, ExpectEvents, X, X],
        [X, X, X, HeaderState::ExpectBody, X],
        [X, X, X, X, A],
        [X, X, X, X, A],
    ]
};

impl HeaderState {
    fn next(self, token: Option<Token>) -> Self {
        let row = match token {
            Some(Token::Version) => 0,
            Some(Token::Cmd) => 1,
            Some(Token::Part) => 2,
            Some(Token::Events) => 3,
            Some(Token::File) => 4,
            Some(Token::Eof) => 5,
            _ => return Self::Error,
        };
        let column = match self {
            Self::Start => 0,
            Self::ExpectCmd => 1,
            Self::ExpectPart => 2,
            Self::ExpectEvents => 3,
            Self::ExpectBody => 4,
            Self::Accept | Self::Error => return self,
        };
        HEADER_FSM[row][column]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyState {
    /// Header lines, waiting for the first `fl=` or eof
    Preamble,
    /// Got `fl=`, expecting `fn=`
    EntryFile,
    /// Got `fn=`, expecting the cost line or `summary:`
    EntryFunction,
    /// Got the entry's cost line, expecting `fl=`, `cfn=` or eof
    EntryCost,
    /// Got `cfn=`, expecting `calls=`
    CallTarget,
    /// Got `calls=`, expecting the call's cost line
    CallCount,
    /// Got the call's cost line, expecting `fl=`, `cfn=` or eof
    CallCost,
    /// Got `summary:`, expecting the entry's cost line
    Summary,
    Accept,
    Error,
}

/// Rows: header, fl, fn, cost, cfn, calls, summary, eof. Columns: the eight
/// live states in declaration order.
const BODY_FSM: [[BodyState; 8]; 8] = {
    use BodyState::{
        Accept as A, CallCost, CallTarget, EntryCost, EntryFile, EntryFunction, Error as X,
        Preamble, Summary,
    };
    [
        [Preamble, X, X, X, X, X, X, X],
        [EntryFile, X, X, EntryFile, X, X, EntryFile, X],
        [X, EntryFunction, X, X, X, X, X, X],
        [X, X, EntryCost, X, X, CallCost, X, EntryCost],
        [X, X, X, CallTarget, X, X, CallTarget, X],
        [X, X, X, X, BodyState::CallCount, X, X, X],
        [X, X, Summary, X, X, X, X, X],
        [A, X, X, A, X, X, A, X],
    ]
};

impl BodyState {
    fn next(self, token: Option<Token>) -> Self {
        let row = match token {
            Some(Token::HeaderLine) => 0,
            Some(Token::File) => 1,
            Some(Token::Function) => 2,
            Some(Token::Cost) => 3,
            Some(Token::CallTarget) => 4,
            Some(Token::Calls) => 5,
            Some(Token::Summary) => 6,
            Some(Token::Eof) => 7,
            _ => return Self::Error,
        };
        let column = match self {
            Self::Preamble => 0,
            Self::EntryFile => 1,
            Self::EntryFunction => 2,
            Self::EntryCost => 3,
            Self::CallTarget => 4,
            Self::CallCount => 5,
            Self::CallCost => 6,
            Self::Summary => 7,
            Self::Accept | Self::Error => return self,
        };
        BODY_FSM[row][column]
    }
}

fn classify_header_line(line: &str) -> Option<Token> {
    if line.strip_prefix(VERSION_PREFIX) == Some(FORMAT_VERSION) {
        Some(Token::Version)
    } else if line.starts_with(CMD_PREFIX) {
        Some(Token::Cmd)
    } else if line.strip_prefix(PART_PREFIX) == Some(FORMAT_PART) {
        Some(Token::Part)
    } else if line.strip_prefix(EVENTS_PREFIX) == Some(FORMAT_EVENTS) {
        Some(Token::Events)
    } else if line.starts_with(FILE_PREFIX) {
        Some(Token::File)
    } else {
        None
    }
}

fn classify_body_line(line: &str, state: BodyState) -> Option<Token> {
    if line.starts_with(|c: char| c.is_ascii_digit()) {
        Some(Token::Cost)
    } else if line.starts_with(FILE_PREFIX) {
        Some(Token::File)
    } else if line.starts_with(FUNCTION_PREFIX) {
        Some(Token::Function)
    } else if line.starts_with(CALL_TARGET_PREFIX) {
        Some(Token::CallTarget)
    } else if line.starts_with(CALLS_PREFIX) {
        Some(Token::Calls)
    } else if line.starts_with(SUMMARY_PREFIX) {
        Some(Token::Summary)
    } else if state == BodyState::Preamble {
        Some(Token::HeaderLine)
    } else {
        None
    }
}

/// Parse a `<position> <time>` line
fn parse_cost_line(line: &str) -> Option<(u64, u64)> {
    let (position, time) = line.split_once(' ')?;
    Some((position.parse().ok()?, time.parse().ok()?))
}

/// Numbered lines of the input followed by a single end-of-input marker
fn numbered_lines(source: &str) -> impl Iterator<Item = (usize, Option<&str>)> {
    let line_count = source.lines().count();
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, Some(line)))
        .chain(iter::once((line_count, None)))
}

/// FSA based reader for a single cachegrind file
///
/// The header and the body are read by two independent passes over the same
/// text; [`CachegrindParser::get_body`] validates the header on its own.
#[derive(Debug, Clone)]
pub struct CachegrindParser {
    source: String,
}

impl CachegrindParser {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read a profile file into memory
    ///
    /// xdebug writes file and function names as raw bytes. Invalid UTF-8
    /// sequences are replaced with U+FFFD instead of failing the read, so
    /// such names no longer round-trip byte for byte.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        debug!("Reading cachegrind file: {}", path.display());
        let source = match String::from_utf8(std::fs::read(path)?) {
            Ok(source) => source,
            Err(e) => {
                warn!("{} is not valid UTF-8, replacing invalid bytes", path.display());
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Self::new(source))
    }

    /// Validate the header block and capture its values
    pub fn get_header(&self) -> Result<RawHeader, ParseError> {
        let mut state = HeaderState::Start;
        let mut cmd = String::new();

        for (line_no, line) in numbered_lines(&self.source) {
            let token = match line {
                Some("") => continue,
                Some(text) => classify_header_line(text),
                None => Some(Token::Eof),
            };
            let text = line.unwrap_or_default();

            state = state.next(token);
            match state {
                HeaderState::Accept => break,
                HeaderState::Error => {
                    return Err(ParseError::Grammar {
                        line_no,
                        line: text.to_string(),
                        token,
                    })
                }
                HeaderState::ExpectPart => cmd = text[CMD_PREFIX.len()..].to_string(),
                _ => {}
            }
        }

        debug!("Parsed header for: {}", cmd);
        Ok(RawHeader::new(cmd))
    }

    /// Read every entry in file order
    ///
    /// File order is the order in which calls returned: an entry appears
    /// after all of its callees.
    pub fn get_body(&self, names: &mut NameTable) -> Result<RawBody, ParseError> {
        let header = self.get_header()?;

        // Parse-local lookups keyed by slices of the source, so repeated names
        // skip both the allocation and the shared table
        let mut file_cache: HashMap<&str, FileName> = HashMap::new();
        let mut function_cache: HashMap<&str, FunctionName> = HashMap::new();

        let mut entries: Vec<RawEntry> = Vec::new();
        let mut pending_file: Option<FileName> = None;
        let mut state = BodyState::Preamble;

        for (line_no, line) in numbered_lines(&self.source) {
            let token = match line {
                Some("") => continue,
                Some(text) => classify_body_line(text, state),
                None => Some(Token::Eof),
            };
            let text = line.unwrap_or_default();
            let violation = || ParseError::Grammar {
                line_no,
                line: text.to_string(),
                token,
            };
            let invalid_number = || ParseError::InvalidNumber {
                line_no,
                line: text.to_string(),
                token,
            };

            state = state.next(token);
            match state {
                BodyState::Accept => break,
                BodyState::Error => return Err(violation()),
                BodyState::Preamble | BodyState::CallCount => {}
                BodyState::EntryFile => {
                    let value = &text[FILE_PREFIX.len()..];
                    let file = *file_cache
                        .entry(value)
                        .or_insert_with(|| names.intern_file(value));
                    pending_file = Some(file);
                }
                BodyState::EntryFunction => {
                    let value = &text[FUNCTION_PREFIX.len()..];
                    let function = *function_cache
                        .entry(value)
                        .or_insert_with(|| names.intern_function(value));
                    let file = pending_file.take().ok_or_else(violation)?;
                    entries.push(RawEntry::new(file, function));
                }
                BodyState::Summary => {
                    let summary = text[SUMMARY_PREFIX.len()..]
                        .parse()
                        .map_err(|_| invalid_number())?;
                    let entry = entries.last_mut().ok_or_else(violation)?;
                    entry.summary = Some(summary);
                }
                BodyState::EntryCost => {
                    let (position, self_time) = parse_cost_line(text).ok_or_else(invalid_number)?;
                    let entry = entries.last_mut().ok_or_else(violation)?;
                    entry.position = position;
                    entry.self_time = self_time;
                }
                BodyState::CallTarget => {
                    let value = &text[CALL_TARGET_PREFIX.len()..];
                    let function = *function_cache
                        .entry(value)
                        .or_insert_with(|| names.intern_function(value));
                    let entry = entries.last_mut().ok_or_else(violation)?;
                    entry.calls.push(RawCall {
                        function,
                        position: 0,
                        inclusive_time: 0,
                    });
                }
                BodyState::CallCost => {
                    let (position, inclusive_time) =
                        parse_cost_line(text).ok_or_else(invalid_number)?;
                    let call = entries
                        .last_mut()
                        .and_then(|entry| entry.calls.last_mut())
                        .ok_or_else(violation)?;
                    call.position = position;
                    call.inclusive_time = inclusive_time;
                }
            }
        }

        debug!(
            "Parsed {} entries ({} files, {} functions interned)",
            entries.len(),
            names.file_count(),
            names.function_count()
        );

        Ok(RawBody { header, entries })
    }
}
