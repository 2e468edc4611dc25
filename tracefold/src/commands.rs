//! Command implementations for the `tracefold` binary: load a program
//! description, reduce every trace in the input, and print the results.

use std::fs;
use std::io::Read;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::cli::{Cli, OnError};
use crate::config::Config;
use crate::digest::trace_digest;
use crate::format;
use crate::program::{FunId, Program};
use crate::reduce::{PathReducer, Segment, DEFAULT_MAX_DEPTH};

/// Default fold bound when neither the CLI nor the config sets one.
pub const DEFAULT_K: usize = 2;

/// Result of reducing one trace line.
#[derive(Serialize)]
struct TraceReport {
    /// 0-based line index in the trace input.
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    reduced: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Parses `args` (without the binary name) and runs the reduction pipeline.
/// Returns the process exit code.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    let cli = Cli::parse_from(std::iter::once("tracefold".to_owned()).chain(args));
    run(&cli)
}

/// Runs the pipeline for already-parsed arguments.
pub fn run(cli: &Cli) -> Result<i32> {
    let config = Config::load();
    let k = cli.k.or(config.tracefold.k).unwrap_or(DEFAULT_K);
    let max_depth = cli
        .max_depth
        .or(config.tracefold.max_depth)
        .unwrap_or(DEFAULT_MAX_DEPTH);

    let source = fs::read_to_string(&cli.program)
        .with_context(|| format!("failed to read program file {}", cli.program.display()))?;
    let program = Arc::new(
        format::parse_program(&source)
            .with_context(|| format!("invalid program file {}", cli.program.display()))?,
    );
    let entry = resolve_entry(
        &program,
        cli.entry.as_deref().or(config.tracefold.entry.as_deref()),
    )?;
    debug!(
        "program: {} functions, {} blocks; entry {entry}, k {k}",
        program.function_count(),
        program.block_count()
    );

    let reducer = PathReducer::new(Arc::clone(&program), k).with_max_depth(max_depth);

    let input = match &cli.traces {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read traces file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read traces from stdin")?;
            buf
        }
    };
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect();

    // Reductions over one shared context are independent; fan out per line.
    let reports: Vec<TraceReport> = lines
        .par_iter()
        .map(|&(index, line)| reduce_line(&reducer, entry, index, line, cli))
        .collect();

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }
    Ok(i32::from(failed > 0))
}

fn reduce_line(
    reducer: &PathReducer,
    entry: FunId,
    index: usize,
    line: &str,
    cli: &Cli,
) -> TraceReport {
    let path = match format::parse_trace(line) {
        Ok(path) => path,
        Err(err) => return failure(index, line, &err.to_string(), cli),
    };
    match reducer.reduce(&path, entry) {
        Ok(text) => {
            let tree = if cli.json && !path.is_empty() {
                reducer.reduce_tree(&path, entry).ok()
            } else {
                None
            };
            TraceReport {
                index,
                digest: cli.digest.then(|| trace_digest(&text)),
                reduced: Some(text),
                tree,
                error: None,
            }
        }
        Err(err) => failure(index, line, &err.to_string(), cli),
    }
}

fn failure(index: usize, line: &str, message: &str, cli: &Cli) -> TraceReport {
    let reduced = match cli.on_error {
        OnError::Report => None,
        // The original path, normalized to space-separated ids.
        OnError::FullPath => Some(
            line.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        OnError::Empty => Some(String::new()),
    };
    let error = matches!(cli.on_error, OnError::Report).then(|| message.to_owned());
    TraceReport {
        index,
        reduced,
        digest: None,
        tree: None,
        error,
    }
}

fn print_report(report: &TraceReport) {
    if let Some(err) = &report.error {
        println!("trace {}: error: {err}", report.index);
    } else if let Some(digest) = &report.digest {
        println!("trace {}: {digest}", report.index);
    } else {
        println!(
            "trace {}: {}",
            report.index,
            report.reduced.as_deref().unwrap_or_default()
        );
    }
}

fn resolve_entry(program: &Program, name: Option<&str>) -> Result<FunId> {
    match name {
        Some(name) => program
            .function_by_name(name)
            .map(|f| f.id)
            .ok_or_else(|| anyhow!("entry function `{name}` is not declared in the program")),
        None => program
            .functions()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| anyhow!("program file declares no functions")),
    }
}
