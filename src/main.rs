//! xdebug-calltree CLI
//!
//! Turns xdebug cachegrind profiles into call graphs and flamegraphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use xdebug_calltree::commands::{
    display_version, execute_graph, execute_split, validate_args, validate_profile_file,
    AggregateMode, GraphArgs, OutputFormat,
};
use xdebug_calltree::flamegraph::FlamegraphConfig;
use xdebug_calltree::utils::config::DEFAULT_THRESHOLD_PERCENT;

/// xdebug-calltree - call graphs for xdebug profiles
#[derive(Parser, Debug)]
#[command(name = "xdebug-calltree")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge profiles into one call graph
    Graph {
        /// Cachegrind files to merge
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Ignore files that can't be parsed
        #[arg(short, long)]
        ignore: bool,

        /// Remove fast tails that took less than PERCENT of total execution time
        #[arg(short, long, value_name = "PERCENT", default_value_t = DEFAULT_THRESHOLD_PERCENT)]
        threshold: f64,

        /// Aggregation mode: "func-file" keys calls by the (file, function)
        /// pairs of their stack, "none" keeps every call (memory hungry)
        #[arg(short, long, value_enum, default_value_t = AggregateMode::FuncFile)]
        aggregate: AggregateMode,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Dot)]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,
    },

    /// Split files holding several profiling runs
    Split {
        /// Files to split
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Validate a cachegrind file
    Validate {
        /// Path to cachegrind file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Graph {
            files,
            ignore,
            threshold,
            aggregate,
            format,
            output,
            title,
            width,
        } => {
            let fg_config = if format == OutputFormat::Svg {
                let mut config = FlamegraphConfig::new().with_width(width);
                if let Some(title_str) = title {
                    config = config.with_title(title_str);
                }
                Some(config)
            } else {
                None
            };

            let args = GraphArgs {
                inputs: files,
                ignore_errors: ignore,
                threshold,
                aggregate,
                format,
                output,
                flamegraph_config: fg_config,
            };

            validate_args(&args)?;
            execute_graph(args)?;
        }

        Commands::Split { files } => {
            execute_split(&files)?;
        }

        Commands::Validate { file } => {
            validate_profile_file(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
