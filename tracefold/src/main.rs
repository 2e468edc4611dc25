//! Main binary entry point for the `tracefold` trace reduction tool.
//!
//! This binary simply delegates to the shared `commands::run_with_args()`
//! function so the command line and library surfaces stay consistent.

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();
    let code = tracefold::commands::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
