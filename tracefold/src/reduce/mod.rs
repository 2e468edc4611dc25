//! Path reduction: call-tree segmentation, loop folding, and serialization.
//!
//! A [`PathReducer`] is bound to one shared [`Program`] and one fold bound
//! `k`. Its single operation turns a raw trace (a flat sequence of block ids)
//! into a reduced call tree and renders that tree as deterministic text:
//! nested calls become nested segments, and runs of more than `k` identical
//! loop iterations collapse into a count-annotated fold marker.
//!
//! Reduction is pure computation: the program context and the raw path are
//! never mutated, and `reduce` takes `&self`, so one reducer may serve any
//! number of concurrent calls.

mod fold;
mod render;
mod segment;


use std::sync::Arc;

use serde::Serialize;

use crate::error::ReduceError;
use crate::program::{BlockId, FunId, Program};

/// Sentinel text returned for an empty raw path.
pub const EMPTY_TRACE: &str = "<empty>";

/// Default bound on activation and fold nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// One function activation in the reduced call tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// The function this activation ran in.
    pub fun: FunId,
    /// Everything that happened inside the activation, in trace order.
    pub events: Vec<Event>,
}

/// An entry of a [`Segment`]: a literal block, a nested call, or a folded
/// run of repeated events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Event {
    /// A single basic block was executed.
    Block(BlockId),
    /// A callee activation, nested at the point its call edge was taken.
    Call(Segment),
    /// `body` repeated `count` times back to back.
    Repeat {
        /// How many literal repetitions the marker stands for.
        count: usize,
        /// The repeated event sequence.
        body: Vec<Event>,
    },
}

impl Segment {
    /// Expands the reduced tree back into the literal block sequence:
    /// fold bodies are repeated `count` times and nested calls are inlined
    /// in place. For any tree produced by [`PathReducer::reduce_tree`] this
    /// reproduces the raw path exactly.
    #[must_use]
    pub fn flatten(&self) -> Vec<BlockId> {
        let mut out = Vec::new();
        flatten_events(&self.events, &mut out);
        out
    }
}

fn flatten_events(events: &[Event], out: &mut Vec<BlockId>) {
    for event in events {
        match event {
            Event::Block(block) => out.push(*block),
            Event::Call(callee) => flatten_events(&callee.events, out),
            Event::Repeat { count, body } => {
                for _ in 0..*count {
                    flatten_events(body, out);
                }
            }
        }
    }
}

/// Reduces raw traces of one program under a fixed fold bound.
///
/// The bound `k` is the fidelity/size trade-off: a run of identical loop
/// iterations is folded into a single marker only when it is longer than
/// `k`, and `k = 0` disables folding entirely. The program context must
/// outlive the reducer, which the `Arc` link enforces.
#[derive(Debug, Clone)]
pub struct PathReducer {
    program: Arc<Program>,
    k: usize,
    max_depth: usize,
}

impl PathReducer {
    /// Binds a reducer to a program and a fold bound.
    #[must_use]
    pub fn new(program: Arc<Program>, k: usize) -> Self {
        Self {
            program,
            k,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Overrides the nesting-depth bound (minimum 1). Traces nesting deeper
    /// than this fail with [`ReduceError::DepthLimit`] instead of growing
    /// without bound.
    #[must_use]
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit.max(1);
        self
    }

    /// The bound this reducer folds with.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// The shared program context.
    #[must_use]
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    /// Reduces `path` to its textual form. The returned string is owned by
    /// the caller. Identical inputs always produce byte-identical output.
    ///
    /// An empty path reduces to [`EMPTY_TRACE`]; every precondition
    /// violation is reported as a distinct [`ReduceError`].
    pub fn reduce(&self, path: &[BlockId], entry: FunId) -> Result<String, ReduceError> {
        if path.is_empty() {
            if self.program.function(entry).is_none() {
                return Err(ReduceError::UnknownFunction(entry));
            }
            return Ok(EMPTY_TRACE.to_owned());
        }
        let tree = self.reduce_tree(path, entry)?;
        debug_assert_eq!(tree.flatten(), path);
        let text = render::render(&tree, &self.program);
        log::trace!("reduced {} blocks to {} bytes", path.len(), text.len());
        Ok(text)
    }

    /// Reduces `path` to the call tree behind the textual form.
    pub fn reduce_tree(&self, path: &[BlockId], entry: FunId) -> Result<Segment, ReduceError> {
        segment::Walker::new(&self.program, self.k, self.max_depth).walk(path, entry)
    }
}
