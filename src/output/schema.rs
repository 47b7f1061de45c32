//! Output JSON schema definitions for profile data.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::aggregator::{CallSite, CallTree, FunctionTable, TimeStats};
use crate::parser::NameTable;
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Scripts the merged runs were recorded for
    pub commands: Vec<String>,

    /// Inclusive time of the whole tree
    pub total_time: u64,

    pub max_self_time: u64,

    pub max_call_count: u64,

    /// Physical calls read from the input files
    pub total_call_count: u64,

    pub root: ProfileNode,

    /// Flat per-function view, in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionProfile>,

    /// Timestamp when profile was generated
    pub generated_at: String,
}

/// One call tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileNode {
    /// Display label (clean function name or included file)
    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    pub call_count: u64,

    pub self_time: TimeSummary,

    pub inclusive_time: TimeSummary,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ProfileNode>,
}

/// All invocations of one function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionProfile {
    pub function: String,

    /// Clean function name or included file
    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    pub line: u64,

    pub invocation_count: u64,

    pub self_time: u64,

    pub inclusive_time: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub called_from: Vec<CallSiteProfile>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_calls: Vec<CallSiteProfile>,
}

/// Calls between two functions from one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteProfile {
    pub function: String,
    pub line: u64,
    pub call_count: u64,
    pub time: u64,
}

/// Min/max/sum of a time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSummary {
    pub min: u64,
    pub max: u64,
    pub sum: u64,
}

impl From<&TimeStats> for TimeSummary {
    fn from(stats: &TimeStats) -> Self {
        Self {
            min: stats.min(),
            max: stats.max(),
            sum: stats.sum(),
        }
    }
}

/// Convert a call tree to the output profile format
///
/// **Public** - used by the graph command to create JSON output
pub fn to_profile(
    tree: &CallTree,
    functions: &FunctionTable,
    names: &NameTable,
    commands: Vec<String>,
) -> Profile {
    use chrono::Utc;

    Profile {
        version: SCHEMA_VERSION.to_string(),
        commands,
        total_time: tree.total_time(),
        max_self_time: tree.max_self_time(),
        max_call_count: tree.max_call_count(),
        total_call_count: tree.total_call_count(),
        root: build_nodes(tree, names),
        functions: build_functions(functions, names),
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Build the nested node structure without recursion
///
/// **Private** - internal helper for to_profile
fn build_nodes(tree: &CallTree, names: &NameTable) -> ProfileNode {
    let order: Vec<_> = tree.walk().map(|(_, id)| id).collect();
    let mut built: Vec<Option<ProfileNode>> = vec![None; order.len()];
    let mut position = vec![usize::MAX; order.iter().map(|id| id.index() + 1).max().unwrap_or(0)];
    for (pos, id) in order.iter().enumerate() {
        position[id.index()] = pos;
    }

    // children come after their parent in pre-order, so a reverse sweep has
    // every child ready when its parent is built
    for (pos, &id) in order.iter().enumerate().rev() {
        let node = tree.node(id);
        let children = node
            .children()
            .iter()
            .filter_map(|child| built[position[child.index()]].take())
            .collect();

        built[pos] = Some(ProfileNode {
            label: node
                .key()
                .map_or_else(|| "root".to_string(), |k| k.label(names).to_string()),
            file: node.file().map(|f| names.file(f).to_string()),
            function: node.function().map(|f| names.function(f).to_string()),
            call_count: node.call_count(),
            self_time: node.self_time().into(),
            inclusive_time: node.inclusive_time().into(),
            children,
        });
    }

    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| ProfileNode {
            label: "root".to_string(),
            file: None,
            function: None,
            call_count: 0,
            self_time: TimeSummary { min: 0, max: 0, sum: 0 },
            inclusive_time: TimeSummary { min: 0, max: 0, sum: 0 },
            children: Vec::new(),
        })
}

fn build_functions(table: &FunctionTable, names: &NameTable) -> Vec<FunctionProfile> {
    let sites = |sites: &[CallSite]| {
        sites
            .iter()
            .map(|site| CallSiteProfile {
                function: names.function(site.function).to_string(),
                line: site.line,
                call_count: site.call_count,
                time: site.summed_call_time,
            })
            .collect()
    };

    table
        .iter()
        .map(|summary| FunctionProfile {
            function: names.function(summary.function).to_string(),
            label: names.clean_label(summary.function).to_string(),
            file: summary.file.map(|f| names.file(f).to_string()),
            line: summary.line,
            invocation_count: summary.invocation_count,
            self_time: summary.summed_self_time,
            inclusive_time: summary.summed_inclusive_time,
            called_from: sites(&summary.called_from),
            sub_calls: sites(&summary.sub_calls),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{build_call_tree, build_function_table};
    use crate::parser::{RawCall, RawEntry};

    #[test]
    fn test_profile_mirrors_tree() {
        let mut names = NameTable::new();
        let file = names.intern_file("/srv/app.php");
        let main = names.intern_function("{main}");
        let inc = names.intern_function("include::/srv/conf.php");

        let mut child = RawEntry::new(file, inc);
        child.self_time = 5;
        let mut root = RawEntry::new(file, main);
        root.self_time = 10;
        root.calls = vec![RawCall { function: inc, position: 1, inclusive_time: 5 }];

        let entries = [child, root];
        let tree = build_call_tree(&entries).unwrap();
        let functions = build_function_table(&entries);
        let profile = to_profile(&tree, &functions, &names, vec!["/srv/app.php".to_string()]);

        assert_eq!(profile.total_time, 15);
        assert_eq!(profile.total_call_count, 2);
        assert_eq!(profile.root.label, "root");
        assert_eq!(profile.root.children.len(), 1);

        let main_node = &profile.root.children[0];
        assert_eq!(main_node.label, "{main}");
        assert_eq!(main_node.inclusive_time.sum, 15);
        assert_eq!(main_node.children[0].label, "/srv/conf.php");
        assert_eq!(
            main_node.children[0].function.as_deref(),
            Some("include::/srv/conf.php")
        );

        assert_eq!(profile.functions.len(), 2);
        let included = &profile.functions[0];
        assert_eq!(included.label, "/srv/conf.php");
        assert_eq!(included.invocation_count, 1);
        assert_eq!(
            included.called_from,
            [CallSiteProfile {
                function: "{main}".to_string(),
                line: 1,
                call_count: 1,
                time: 5,
            }]
        );
        assert_eq!(profile.functions[1].inclusive_time, 15);
    }
}
