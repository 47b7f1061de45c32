//! Flat per-function profile.
//!
//! Where the call tree keeps every call path apart, the function table folds
//! all invocations of a function into one row, together with who called it
//! and what it called. Call sites are keyed by the other function and the
//! line of the call, so two calls from different lines of the same caller
//! stay separate.

use crate::parser::{FileName, FunctionName, RawEntry};
use log::debug;
use std::collections::HashMap;

/// Calls between two functions from one source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// The caller (in `called_from`) or the callee (in `sub_calls`)
    pub function: FunctionName,
    /// Line of the call inside the caller
    pub line: u64,
    pub call_count: u64,
    /// Summed inclusive time of the calls made from this site
    pub summed_call_time: u64,
}

/// Every invocation of one function, folded together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSummary {
    pub function: FunctionName,
    /// File of the first invocation; `None` for a function that was only
    /// seen as a call target
    pub file: Option<FileName>,
    /// Line of the last invocation's cost record
    pub line: u64,
    pub invocation_count: u64,
    pub summed_self_time: u64,
    pub summed_inclusive_time: u64,
    pub called_from: Vec<CallSite>,
    pub sub_calls: Vec<CallSite>,
}

impl FunctionSummary {
    fn new(function: FunctionName) -> Self {
        Self {
            function,
            file: None,
            line: 0,
            invocation_count: 0,
            summed_self_time: 0,
            summed_inclusive_time: 0,
            called_from: Vec::new(),
            sub_calls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Direction {
    CalledFrom,
    SubCall,
}

/// Function summaries in first-seen order
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: Vec<FunctionSummary>,
    index: HashMap<FunctionName, usize>,
    // (owner row, direction, other function, line) -> position in the owner's list
    sites: HashMap<(usize, Direction, FunctionName, u64), usize>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold raw entries in file order into the table
    ///
    /// Entries of several files can be added as long as they were parsed
    /// with the same [`NameTable`](crate::parser::NameTable).
    pub fn add_entries(&mut self, entries: &[RawEntry]) {
        for entry in entries {
            let row = self.row(entry.function);
            let summary = &mut self.functions[row];
            summary.file.get_or_insert(entry.file);
            summary.line = entry.position;
            summary.invocation_count = summary.invocation_count.saturating_add(1);
            summary.summed_self_time = summary.summed_self_time.saturating_add(entry.self_time);
            summary.summed_inclusive_time =
                summary.summed_inclusive_time.saturating_add(entry.self_time);

            for call in &entry.calls {
                let summary = &mut self.functions[row];
                summary.summed_inclusive_time =
                    summary.summed_inclusive_time.saturating_add(call.inclusive_time);

                let callee = self.row(call.function);
                self.record(callee, Direction::CalledFrom, entry.function, call.position, call.inclusive_time);
                self.record(row, Direction::SubCall, call.function, call.position, call.inclusive_time);
            }
        }

        debug!("Function table holds {} functions", self.functions.len());
    }

    fn row(&mut self, function: FunctionName) -> usize {
        let functions = &mut self.functions;
        *self.index.entry(function).or_insert_with(|| {
            functions.push(FunctionSummary::new(function));
            functions.len() - 1
        })
    }

    fn record(&mut self, row: usize, direction: Direction, other: FunctionName, line: u64, time: u64) {
        let summary = &mut self.functions[row];
        let list = match direction {
            Direction::CalledFrom => &mut summary.called_from,
            Direction::SubCall => &mut summary.sub_calls,
        };
        let slot = *self
            .sites
            .entry((row, direction, other, line))
            .or_insert_with(|| {
                list.push(CallSite {
                    function: other,
                    line,
                    call_count: 0,
                    summed_call_time: 0,
                });
                list.len() - 1
            });

        let site = &mut list[slot];
        site.call_count = site.call_count.saturating_add(1);
        site.summed_call_time = site.summed_call_time.saturating_add(time);
    }

    pub fn get(&self, function: FunctionName) -> Option<&FunctionSummary> {
        self.index.get(&function).map(|&row| &self.functions[row])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionSummary> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Summaries sorted by summed self time, heaviest first
    pub fn by_self_time(&self) -> Vec<&FunctionSummary> {
        let mut rows: Vec<_> = self.functions.iter().collect();
        rows.sort_by(|a, b| b.summed_self_time.cmp(&a.summed_self_time));
        rows
    }
}

/// Build a function table from the entries of one file
pub fn build_function_table(entries: &[RawEntry]) -> FunctionTable {
    let mut table = FunctionTable::new();
    table.add_entries(entries);
    table
}
