use super::*;
use crate::error::ContextError;

fn straight_line() -> Program {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    for block in [0, 1, 2] {
        builder.add_block(main, block);
    }
    builder.add_successor(0, 1);
    builder.add_successor(1, 2);
    builder.build().unwrap()
}

#[test]
fn test_basic_queries() {
    let program = straight_line();
    assert_eq!(program.function_count(), 1);
    assert_eq!(program.block_count(), 3);
    assert_eq!(program.owner(1), Some(0));
    assert_eq!(program.owner(99), None);
    assert_eq!(program.entry(0), Some(0));
    assert_eq!(program.successors(0), &[1]);
    assert_eq!(program.predecessors(2), &[1]);
    assert_eq!(program.call_target(1), None);
    assert!(program.is_exit(2));
    assert!(!program.is_exit(0));
    assert_eq!(program.function_by_name("main").map(|f| f.id), Some(0));
    assert!(program.function_by_name("other").is_none());
}

#[test]
fn test_exits_are_blocks_without_successors() {
    let program = straight_line();
    let main = program.function(0).unwrap();
    assert_eq!(main.exits.len(), 1);
    assert!(main.exits.contains(&2));
}

#[test]
fn test_loop_header_from_back_edge() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    for block in [0, 1, 2] {
        builder.add_block(main, block);
    }
    builder.add_successor(0, 1);
    builder.add_successor(1, 0);
    builder.add_successor(0, 2);
    let program = builder.build().unwrap();

    assert!(program.is_loop_header(0));
    assert!(!program.is_loop_header(1));
    assert!(program.is_back_edge(1, 0));
    assert!(!program.is_back_edge(0, 1));
    assert_eq!(program.function(main).unwrap().back_edges, vec![(1, 0)]);
}

#[test]
fn test_nested_loops_have_their_own_headers() {
    // 0 -> 1 -> 2 -> 3 -> 2 (inner), 2 -> 4 -> 1 (outer), 1 -> 5
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    for block in 0..=5 {
        builder.add_block(main, block);
    }
    for (from, to) in [(0, 1), (1, 2), (2, 3), (3, 2), (2, 4), (4, 1), (1, 5)] {
        builder.add_successor(from, to);
    }
    let program = builder.build().unwrap();

    let headers = &program.function(main).unwrap().loop_headers;
    assert!(headers.contains(&1), "outer header missing");
    assert!(headers.contains(&2), "inner header missing");
    assert_eq!(headers.len(), 2);
    assert!(program.is_back_edge(3, 2));
    assert!(program.is_back_edge(4, 1));
}

#[test]
fn test_self_loop_is_a_header() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    for block in [0, 1, 2] {
        builder.add_block(main, block);
    }
    builder.add_successor(0, 1);
    builder.add_successor(1, 1);
    builder.add_successor(1, 2);
    let program = builder.build().unwrap();

    assert!(program.is_loop_header(1));
    assert!(program.is_back_edge(1, 1));
}

#[test]
fn test_call_marks_resolve() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    let helper = builder.add_function("helper");
    builder.add_block(main, 0);
    builder.add_block(helper, 10);
    builder.mark_call(0, helper);
    let program = builder.build().unwrap();

    assert_eq!(program.call_target(0), Some(helper));
    assert_eq!(program.call_target(10), None);
}

#[test]
fn test_dangling_edge_rejected() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    builder.add_block(main, 0);
    builder.add_successor(0, 99);
    assert_eq!(
        builder.build().unwrap_err(),
        ContextError::DanglingEdge { from: 0, to: 99 }
    );
}

#[test]
fn test_cross_function_edge_rejected() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    let helper = builder.add_function("helper");
    builder.add_block(main, 0);
    builder.add_block(helper, 10);
    builder.add_successor(0, 10);
    assert_eq!(
        builder.build().unwrap_err(),
        ContextError::CrossFunctionEdge {
            from: 0,
            to: 10,
            from_fun: main,
            to_fun: helper,
        }
    );
}

#[test]
fn test_duplicate_block_rejected() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    let helper = builder.add_function("helper");
    builder.add_block(main, 0);
    builder.add_block(helper, 0);
    assert_eq!(
        builder.build().unwrap_err(),
        ContextError::DuplicateBlock { block: 0 }
    );
}

#[test]
fn test_dangling_call_rejected() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    builder.add_block(main, 0);
    builder.mark_call(0, 7);
    assert_eq!(
        builder.build().unwrap_err(),
        ContextError::DanglingCall { block: 0, callee: 7 }
    );
}

#[test]
fn test_unknown_call_site_rejected() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    builder.add_block(main, 0);
    builder.mark_call(99, main);
    assert_eq!(
        builder.build().unwrap_err(),
        ContextError::UnknownCallSite { block: 99 }
    );
}

#[test]
fn test_empty_function_rejected() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    builder.add_block(main, 0);
    builder.add_function("stub");
    let err = builder.build().unwrap_err();
    assert!(matches!(err, ContextError::EmptyFunction { fun: 1, .. }), "{err:?}");
}

#[test]
fn test_block_for_undeclared_function_rejected() {
    let mut builder = Program::builder();
    builder.add_block(5, 0);
    assert_eq!(
        builder.build().unwrap_err(),
        ContextError::UnknownFunction { fun: 5, block: 0 }
    );
}

#[test]
fn test_duplicate_edges_collapse() {
    let mut builder = Program::builder();
    let main = builder.add_function("main");
    builder.add_block(main, 0);
    builder.add_block(main, 1);
    builder.add_successor(0, 1);
    builder.add_successor(0, 1);
    let program = builder.build().unwrap();
    assert_eq!(program.successors(0), &[1]);
    assert_eq!(program.predecessors(1), &[0]);
}
