use crate::flamegraph::FlamegraphConfig;
use crate::utils::config::DEFAULT_THRESHOLD_PERCENT;
use clap::ValueEnum;
use std::path::PathBuf;

/// How merged runs are reduced before rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AggregateMode {
    /// One node per call path of (file, function) pairs
    #[default]
    FuncFile,
    /// Keep every physical call as its own node
    #[value(name = "none")]
    Disabled,
}

/// Rendering of the final tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Graphviz digraph
    #[default]
    Dot,
    /// Nested JSON profile
    Json,
    /// Interactive flamegraph
    Svg,
}

/// Arguments for the graph command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct GraphArgs {
    /// Cachegrind files, merged in the given order
    pub inputs: Vec<PathBuf>,

    /// Skip files that fail to parse instead of aborting
    pub ignore_errors: bool,

    /// Remove subtrees below this percentage of the total time
    pub threshold: f64,

    pub aggregate: AggregateMode,

    pub format: OutputFormat,

    /// Output file; stdout when absent
    pub output: Option<PathBuf>,

    /// Flamegraph configuration, used by the svg format
    pub flamegraph_config: Option<FlamegraphConfig>,
}

impl Default for GraphArgs {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            ignore_errors: false,
            threshold: DEFAULT_THRESHOLD_PERCENT,
            aggregate: AggregateMode::default(),
            format: OutputFormat::default(),
            output: None,
            flamegraph_config: None,
        }
    }
}
