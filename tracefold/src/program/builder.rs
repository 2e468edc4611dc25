use compact_str::CompactString;
use log::debug;
use rustc_hash::FxHashMap;

use super::loops::function_loops;
use super::types::{Block, BlockId, FunId, Function, Program};
use crate::error::ContextError;

/// Builder for assembling a [`Program`] from per-function block tables.
///
/// Declaration order matters twice: functions get ids in the order they are
/// added, and the first block added to a function becomes its entry block.
/// All structural validation happens in [`ProgramBuilder::build`], so the
/// `add_*` methods never fail.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    functions: Vec<(CompactString, Vec<BlockId>)>,
    declarations: Vec<(FunId, BlockId)>,
    edges: Vec<(BlockId, BlockId)>,
    calls: Vec<(BlockId, FunId)>,
}

impl ProgramBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a function and returns its id.
    pub fn add_function(&mut self, name: impl Into<CompactString>) -> FunId {
        let id = self.functions.len() as FunId;
        self.functions.push((name.into(), Vec::new()));
        id
    }

    /// Declares a block owned by `fun`. The first block declared for a
    /// function is its entry block.
    pub fn add_block(&mut self, fun: FunId, block: BlockId) {
        if let Some((_, blocks)) = self.functions.get_mut(fun as usize) {
            blocks.push(block);
        }
        self.declarations.push((fun, block));
    }

    /// Records a control-flow edge between two blocks of the same function.
    pub fn add_successor(&mut self, from: BlockId, to: BlockId) {
        self.edges.push((from, to));
    }

    /// Marks `block` as a call site entering `callee`.
    pub fn mark_call(&mut self, block: BlockId, callee: FunId) {
        self.calls.push((block, callee));
    }

    /// Validates the accumulated tables and derives the structural facts
    /// (exits, loop headers, back edges) every reduction relies on.
    pub fn build(self) -> Result<Program, ContextError> {
        let fun_count = self.functions.len() as FunId;

        let mut blocks: FxHashMap<BlockId, Block> = FxHashMap::default();
        for (fun, id) in self.declarations {
            if fun >= fun_count {
                return Err(ContextError::UnknownFunction { fun, block: id });
            }
            if blocks.insert(id, Block::new(id, fun)).is_some() {
                return Err(ContextError::DuplicateBlock { block: id });
            }
        }

        for (from, to) in self.edges {
            let (Some(src), Some(dst)) = (blocks.get(&from), blocks.get(&to)) else {
                return Err(ContextError::DanglingEdge { from, to });
            };
            if src.fun != dst.fun {
                return Err(ContextError::CrossFunctionEdge {
                    from,
                    to,
                    from_fun: src.fun,
                    to_fun: dst.fun,
                });
            }
            // Mirror edges into both adjacency lists, ignoring duplicates.
            if let Some(src) = blocks.get_mut(&from) {
                if !src.successors.contains(&to) {
                    src.successors.push(to);
                }
            }
            if let Some(dst) = blocks.get_mut(&to) {
                if !dst.predecessors.contains(&from) {
                    dst.predecessors.push(from);
                }
            }
        }

        for (block, callee) in self.calls {
            if callee >= fun_count {
                return Err(ContextError::DanglingCall { block, callee });
            }
            let Some(site) = blocks.get_mut(&block) else {
                return Err(ContextError::UnknownCallSite { block });
            };
            site.calls = Some(callee);
        }

        let mut functions = Vec::with_capacity(self.functions.len());
        let mut names = FxHashMap::default();
        for (id, (name, fun_blocks)) in self.functions.into_iter().enumerate() {
            let id = id as FunId;
            let Some(&entry) = fun_blocks.first() else {
                return Err(ContextError::EmptyFunction {
                    fun: id,
                    name: name.into(),
                });
            };
            let exits = fun_blocks
                .iter()
                .copied()
                .filter(|b| blocks.get(b).is_some_and(|b| b.successors.is_empty()))
                .collect();
            let (loop_headers, back_edges) = function_loops(&blocks, &fun_blocks, entry);
            debug!(
                "function {id} (`{name}`): {} blocks, {} loop headers",
                fun_blocks.len(),
                loop_headers.len()
            );
            if !name.is_empty() {
                names.insert(name.clone(), id);
            }
            functions.push(Function {
                id,
                name,
                entry,
                blocks: fun_blocks,
                exits,
                loop_headers,
                back_edges,
            });
        }

        Ok(Program {
            functions,
            blocks,
            names,
        })
    }
}
