//! Raw records of a cachegrind file.
//!
//! These mirror the file one to one and are kept flat: an entry is written
//! when a call *returns*, so the order of [`RawBody::entries`] is the order in
//! which calls were closed, not the order in which they nest.

use super::names::{FileName, FunctionName, NameTable};
use crate::utils::config::{FORMAT_EVENTS, FORMAT_PART, FORMAT_VERSION};

/// Header block of a cachegrind file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    pub version: String,
    /// Script or request the profile was taken for
    pub cmd: String,
    pub part: String,
    pub events: String,
}

impl RawHeader {
    /// Header of the single supported format flavour
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            cmd: cmd.into(),
            part: FORMAT_PART.to_string(),
            events: FORMAT_EVENTS.to_string(),
        }
    }

    pub fn to_cachegrind(&self) -> String {
        format!(
            "version: {}\ncmd: {}\npart: {}\n\nevents: {}\n\n",
            self.version, self.cmd, self.part, self.events
        )
    }
}

/// One `fl=`/`fn=` block: a finished call and the calls it made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub file: FileName,
    pub function: FunctionName,
    /// Source line of the function
    pub position: u64,
    pub self_time: u64,
    pub calls: Vec<RawCall>,
    /// Total reported on the `{main}` entry; informational only
    pub summary: Option<u64>,
}

impl RawEntry {
    pub fn new(file: FileName, function: FunctionName) -> Self {
        Self {
            file,
            function,
            position: 0,
            self_time: 0,
            calls: Vec::new(),
            summary: None,
        }
    }

    /// Self time plus the inclusive time of every recorded sub-call
    ///
    /// `None` when the sum does not fit in a `u64`; the grammar accepts any
    /// integer, so this can happen on well-formed input.
    pub fn inclusive_time(&self) -> Option<u64> {
        self.calls
            .iter()
            .try_fold(self.self_time, |acc, call| acc.checked_add(call.inclusive_time))
    }

    pub fn to_cachegrind(&self, names: &NameTable) -> String {
        let mut out = format!(
            "fl={}\nfn={}\n",
            names.file(self.file),
            names.function(self.function)
        );
        if let Some(summary) = self.summary {
            out.push_str(&format!("\nsummary: {}\n\n", summary));
        }
        out.push_str(&format!("{} {}\n", self.position, self.self_time));
        for call in &self.calls {
            out.push_str(&call.to_cachegrind(names));
        }
        out.push('\n');
        out
    }
}

/// A `cfn=` block: one call made by the enclosing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall {
    pub function: FunctionName,
    /// Line of the call site in the caller
    pub position: u64,
    pub inclusive_time: u64,
}

impl RawCall {
    pub fn to_cachegrind(&self, names: &NameTable) -> String {
        // xdebug always writes a single call per record
        format!(
            "cfn={}\ncalls=1 0 0\n{} {}\n",
            names.function(self.function),
            self.position,
            self.inclusive_time
        )
    }
}

/// A fully parsed file: header plus entries in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBody {
    pub header: RawHeader,
    pub entries: Vec<RawEntry>,
}

impl RawBody {
    /// Serialize back to the cachegrind text the body was parsed from
    pub fn to_cachegrind(&self, names: &NameTable) -> String {
        let mut out = self.header.to_cachegrind();
        for entry in &self.entries {
            out.push_str(&entry.to_cachegrind(names));
        }
        out
    }
}
