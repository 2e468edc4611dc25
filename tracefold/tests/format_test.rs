//! Tests for the textual program/trace formats and the command pipeline.

use std::fs;
use std::sync::Arc;

use tempfile::tempdir;
use tracefold::format::{parse_program, parse_trace};
use tracefold::{commands, config::Config, ContextError, FormatError, PathReducer};

const PROGRAM: &str = "\
# Demo program: main drives one call into helper.
Function: main
BasicBlock: 0
Successors: 1
BasicBlock: 1 calls helper
Successors: 2
BasicBlock: 2
Successors:

Function: helper
BasicBlock: 10
Successors: 11
BasicBlock: 11
Successors:
";

#[test]
fn test_parse_and_reduce_end_to_end() {
    let program = Arc::new(parse_program(PROGRAM).unwrap());
    assert_eq!(program.function_count(), 2);
    assert_eq!(program.block_count(), 5);

    let main = program.function_by_name("main").unwrap().id;
    let helper = program.function_by_name("helper").unwrap().id;
    assert_eq!(program.call_target(1), Some(helper));
    assert_eq!(program.entry(helper), Some(10));

    let reducer = PathReducer::new(program, 1);
    assert_eq!(
        reducer.reduce(&[0, 1, 10, 11, 2], main).unwrap(),
        "main{ 0 1 helper{ 10 11 } 2 }"
    );
}

#[test]
fn test_callee_may_be_declared_later() {
    // `main` references `helper` before the file declares it.
    let program = parse_program(PROGRAM).unwrap();
    let helper = program.function_by_name("helper").unwrap();
    assert_eq!(helper.id, 1);
}

#[test]
fn test_trace_lines_accept_commas_and_whitespace() {
    assert_eq!(parse_trace("0, 1 2,3").unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(parse_trace("   ").unwrap(), Vec::<u32>::new());
    assert!(matches!(
        parse_trace("0 x 2"),
        Err(FormatError::BadBlockId { token }) if token == "x"
    ));
}

#[test]
fn test_unrecognized_directive_rejected() {
    let err = parse_program("Function: main\nBlock: 0\n").unwrap_err();
    assert!(matches!(err, FormatError::Syntax { line: 2, .. }), "{err}");
}

#[test]
fn test_block_before_function_rejected() {
    let err = parse_program("BasicBlock: 0\n").unwrap_err();
    assert!(matches!(err, FormatError::Syntax { line: 1, .. }), "{err}");
}

#[test]
fn test_unknown_callee_rejected() {
    let source = "Function: main\nBasicBlock: 0 calls ghost\nSuccessors:\n";
    let err = parse_program(source).unwrap_err();
    assert!(
        matches!(err, FormatError::UnknownCallee { block: 0, ref name, .. } if name == "ghost"),
        "{err}"
    );
}

#[test]
fn test_dangling_successor_rejected_at_build() {
    let source = "Function: main\nBasicBlock: 0\nSuccessors: 99\n";
    let err = parse_program(source).unwrap_err();
    assert!(
        matches!(
            err,
            FormatError::Context(ContextError::DanglingEdge { from: 0, to: 99 })
        ),
        "{err}"
    );
}

#[test]
fn test_pipeline_reduces_trace_files() {
    let dir = tempdir().unwrap();
    let program_path = dir.path().join("program.cfg");
    fs::write(&program_path, PROGRAM).unwrap();
    let traces_path = dir.path().join("traces.txt");
    // Second line skips the call (external callee); both are well-formed.
    fs::write(&traces_path, "0 1 10 11 2\n0 1 2\n").unwrap();

    let code = commands::run_with_args(vec![
        program_path.display().to_string(),
        "--traces".to_owned(),
        traces_path.display().to_string(),
        "-k".to_owned(),
        "1".to_owned(),
    ])
    .unwrap();
    assert_eq!(code, 0);
}

#[test]
fn test_pipeline_reports_malformed_traces() {
    let dir = tempdir().unwrap();
    let program_path = dir.path().join("program.cfg");
    fs::write(&program_path, PROGRAM).unwrap();
    let traces_path = dir.path().join("traces.txt");
    // Starts at block 1, not main's entry block.
    fs::write(&traces_path, "1 2\n").unwrap();

    let base = vec![
        program_path.display().to_string(),
        "--traces".to_owned(),
        traces_path.display().to_string(),
    ];

    let code = commands::run_with_args(base.clone()).unwrap();
    assert_eq!(code, 1);

    // The fallback modes turn failures into output instead of exit codes.
    let mut relaxed = base;
    relaxed.push("--on-error".to_owned());
    relaxed.push("full-path".to_owned());
    let code = commands::run_with_args(relaxed).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn test_pipeline_emits_json() {
    let dir = tempdir().unwrap();
    let program_path = dir.path().join("program.cfg");
    fs::write(&program_path, PROGRAM).unwrap();
    let traces_path = dir.path().join("traces.txt");
    fs::write(&traces_path, "0 1 10 11 2\n").unwrap();

    let code = commands::run_with_args(vec![
        program_path.display().to_string(),
        "--traces".to_owned(),
        traces_path.display().to_string(),
        "--json".to_owned(),
        "--digest".to_owned(),
    ])
    .unwrap();
    assert_eq!(code, 0);
}

#[test]
fn test_config_discovery_walks_up() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("tracefold.toml"),
        "[tracefold]\nk = 7\nentry = \"main\"\n",
    )
    .unwrap();
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let config = Config::load_from_path(&nested);
    assert_eq!(config.tracefold.k, Some(7));
    assert_eq!(config.tracefold.entry.as_deref(), Some("main"));
    assert!(config.config_file_path.is_some());
}
