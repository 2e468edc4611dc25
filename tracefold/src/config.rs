//! Configuration file support (`tracefold.toml`).
//!
//! The file is discovered by walking up from the starting directory, so a
//! repository-level config applies in any subdirectory. Command-line flags
//! always override file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Name of the configuration file searched for in each ancestor directory.
pub const CONFIG_FILENAME: &str = "tracefold.toml";

/// Top-level configuration struct.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// The `[tracefold]` section.
    #[serde(default)]
    pub tracefold: TracefoldConfig,
    /// Where the configuration was loaded from; `None` when defaults apply.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

/// Options settable from `tracefold.toml`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct TracefoldConfig {
    /// Fold bound: runs of identical loop iterations longer than `k` are
    /// collapsed; `0` disables folding.
    pub k: Option<usize>,
    /// Bound on activation and fold nesting depth.
    pub max_depth: Option<usize>,
    /// Default entry function name.
    pub entry: Option<String>,
}

impl Config {
    /// Loads configuration from the current directory upwards.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                if let Ok(content) = fs::read_to_string(&candidate) {
                    if let Ok(mut config) = toml::from_str::<Config>(&content) {
                        config.config_file_path = Some(candidate);
                        return config;
                    }
                }
            }
            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}
