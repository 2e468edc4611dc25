//! Command line interface definition.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (tracefold.toml):
  Create this file in your project root to set defaults.

  [tracefold]
  k = 2              # Fold bound; 0 disables folding
  max_depth = 1024   # Bound on call/fold nesting depth
  entry = \"main\"     # Default entry function
";

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Tracefold - reduce raw control-flow traces into compact call trees with loop folding",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    /// Path to the whole-program CFG description (textual format).
    pub program: PathBuf,

    /// File with one raw trace per line (block ids separated by whitespace
    /// or commas). Reads standard input when omitted.
    #[arg(long)]
    pub traces: Option<PathBuf>,

    /// Entry function name. Defaults to the config value, then to the first
    /// function declared in the program file.
    #[arg(long)]
    pub entry: Option<String>,

    /// Fold bound: runs of identical loop iterations longer than K collapse
    /// into a single `(...)xN` marker; 0 disables folding.
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Bound on call/fold nesting depth; deeper traces fail instead of
    /// exhausting memory.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Output one JSON object per trace (reduced tree, text, and digest)
    /// instead of plain text.
    #[arg(long)]
    pub json: bool,

    /// Print the SHA-256 digest of each reduced trace instead of its text.
    #[arg(long)]
    pub digest: bool,

    /// What to do with traces that fail to reduce.
    #[arg(long, value_enum, default_value = "report")]
    pub on_error: OnError,
}

/// Fallback behavior for traces that fail to reduce.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// Report the error and exit nonzero at the end of the run.
    Report,
    /// Emit the raw path verbatim in place of the reduced text.
    FullPath,
    /// Emit an empty result in place of the reduced text.
    Empty,
}
