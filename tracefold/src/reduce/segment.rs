use super::{fold, Event, Segment};
use crate::error::ReduceError;
use crate::program::{BlockId, FunId, Program};

/// One open function activation during segmentation.
struct Frame {
    fun: FunId,
    events: Vec<Event>,
    /// Set when the frame consumed an exit block that is also a call site
    /// (a tail call): the frame pops as soon as the callee returns.
    pending_exit: bool,
}

impl Frame {
    fn new(fun: FunId) -> Self {
        Self {
            fun,
            events: Vec::new(),
            pending_exit: false,
        }
    }
}

/// Walks a raw path once, left to right, splitting it into activations with
/// an explicit frame stack instead of call recursion. This keeps the depth
/// bound enforceable as an error rather than a stack overflow.
pub(super) struct Walker<'a> {
    program: &'a Program,
    k: usize,
    max_depth: usize,
}

impl<'a> Walker<'a> {
    pub(super) fn new(program: &'a Program, k: usize, max_depth: usize) -> Self {
        Self {
            program,
            k,
            max_depth,
        }
    }

    pub(super) fn walk(&self, path: &[BlockId], entry: FunId) -> Result<Segment, ReduceError> {
        let entry_fun = self
            .program
            .function(entry)
            .ok_or(ReduceError::UnknownFunction(entry))?;
        let Some(&first) = path.first() else {
            return Ok(Segment {
                fun: entry,
                events: Vec::new(),
            });
        };
        if first != entry_fun.entry {
            return Err(ReduceError::WrongEntryBlock {
                fun: entry,
                expected: entry_fun.entry,
                found: first,
            });
        }

        let mut stack = vec![Frame::new(entry)];
        let mut root: Option<Segment> = None;

        for &block in path {
            let owner = self
                .program
                .owner(block)
                .ok_or(ReduceError::UnknownBlock(block))?;
            let Some(active) = stack.last().map(|frame| frame.fun) else {
                return Err(ReduceError::TrailingBlock { block });
            };

            // A call edge from the block consumed just before takes priority
            // over staying in the current activation: recursion re-enters the
            // active function's own entry block.
            let callee = stack
                .last()
                .and_then(|frame| frame.events.last())
                .and_then(|event| match event {
                    Event::Block(site) => self.program.call_target(*site),
                    _ => None,
                });
            if callee.is_some_and(|g| self.program.entry(g) == Some(block)) {
                if stack.len() >= self.max_depth {
                    return Err(ReduceError::DepthLimit {
                        limit: self.max_depth,
                    });
                }
                stack.push(Frame::new(owner));
            } else if owner != active {
                return Err(ReduceError::ForeignBlock {
                    block,
                    owner,
                    active,
                });
            }

            let Some(top) = stack.last_mut() else {
                return Err(ReduceError::TrailingBlock { block });
            };
            top.events.push(Event::Block(block));

            if self.program.is_exit(block) {
                if self.program.call_target(block).is_some() {
                    top.pending_exit = true;
                } else {
                    self.finish(&mut stack, &mut root)?;
                }
            }
        }

        // Unwind activations still open when the trace ends; upstream
        // producers routinely truncate paths mid-call.
        while !stack.is_empty() {
            self.finish(&mut stack, &mut root)?;
        }

        Ok(root.unwrap_or(Segment {
            fun: entry,
            events: Vec::new(),
        }))
    }

    /// Pops the top frame, folds it, and attaches it to its caller; keeps
    /// popping while callers were only waiting for a tail call to return.
    fn finish(
        &self,
        stack: &mut Vec<Frame>,
        root: &mut Option<Segment>,
    ) -> Result<(), ReduceError> {
        while let Some(frame) = stack.pop() {
            let events = match self.program.function(frame.fun) {
                Some(function) => fold::fold_events(
                    frame.events,
                    self.k,
                    &function.loop_headers,
                    self.max_depth,
                )?,
                None => frame.events,
            };
            let segment = Segment {
                fun: frame.fun,
                events,
            };
            match stack.last_mut() {
                Some(parent) => {
                    parent.events.push(Event::Call(segment));
                    if parent.pending_exit {
                        continue;
                    }
                    return Ok(());
                }
                None => {
                    *root = Some(segment);
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}
