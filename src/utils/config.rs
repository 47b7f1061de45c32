//! Configuration and constants for the CLI.

/// Current JSON profile schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// The only cachegrind format version the grammar accepts
pub const FORMAT_VERSION: &str = "0.9.6";

/// The only part id the grammar accepts (appended output is not supported)
pub const FORMAT_PART: &str = "1";

/// The only event name the grammar accepts
pub const FORMAT_EVENTS: &str = "Time";

/// Default "fast tail" threshold, in percent of total inclusive time
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 1.0;

/// xdebug reports times in microseconds; renderers show milliseconds
pub const TIME_UNITS_PER_MS: u64 = 1_000;

// Dot labels longer than this are shortened to head + "..." + tail
pub const DOT_LABEL_MAX_CHARS: usize = 30;
pub const DOT_LABEL_HEAD_CHARS: usize = 12;
pub const DOT_LABEL_TAIL_CHARS: usize = 15;

/// Line separating runs in a multi-run dump (xdebug.profiler_append)
pub fn run_separator() -> String {
    format!("{} NEW PROFILING FILE {}", "=".repeat(4), "=".repeat(46))
}
