use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Opaque key naming a basic block, unique within the whole program.
pub type BlockId = u32;

/// Opaque key naming a function.
pub type FunId = u32;

/// A basic block in the whole-program graph.
#[derive(Debug, Clone)]
pub struct Block {
    /// Unique block id.
    pub id: BlockId,
    /// The function owning this block, fixed at construction.
    pub fun: FunId,
    /// Successor block ids (always within the owning function).
    pub successors: SmallVec<[BlockId; 2]>,
    /// Predecessor block ids.
    pub predecessors: SmallVec<[BlockId; 2]>,
    /// Callee entered when this block executes, if it is a call site.
    pub calls: Option<FunId>,
}

impl Block {
    pub(super) fn new(id: BlockId, fun: FunId) -> Self {
        Self {
            id,
            fun,
            successors: SmallVec::new(),
            predecessors: SmallVec::new(),
            calls: None,
        }
    }
}

/// One function of the program: its block set plus derived structural facts.
#[derive(Debug, Clone)]
pub struct Function {
    /// Unique function id.
    pub id: FunId,
    /// Declared name; may be empty for programs built from anonymous tables.
    pub name: CompactString,
    /// Entry block: the first block declared for this function.
    pub entry: BlockId,
    /// All block ids owned by this function, in declaration order.
    pub blocks: Vec<BlockId>,
    /// Exit blocks: blocks with no successors.
    pub exits: FxHashSet<BlockId>,
    /// Targets of back edges within this function.
    pub loop_headers: FxHashSet<BlockId>,
    /// Back edges (`from`, `to`) closing the loops of this function, sorted.
    pub back_edges: Vec<(BlockId, BlockId)>,
}

/// Immutable whole-program view: block ownership, edges, call linkage, and
/// loop structure. Built once by [`super::ProgramBuilder`], then shared
/// read-only by any number of reducers.
#[derive(Debug, Default)]
pub struct Program {
    pub(super) functions: Vec<Function>,
    pub(super) blocks: FxHashMap<BlockId, Block>,
    pub(super) names: FxHashMap<CompactString, FunId>,
}

impl Program {
    /// Starts building a program.
    #[must_use]
    pub fn builder() -> super::ProgramBuilder {
        super::ProgramBuilder::new()
    }

    /// Looks up a function by id.
    #[must_use]
    pub fn function(&self, fun: FunId) -> Option<&Function> {
        self.functions.get(fun as usize)
    }

    /// Looks up a function by its declared name.
    #[must_use]
    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.names
            .get(name)
            .and_then(|&fun| self.functions.get(fun as usize))
    }

    /// Iterates over all functions in id order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    /// Looks up a block by id.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// The function owning `block`, if the block exists.
    #[must_use]
    pub fn owner(&self, block: BlockId) -> Option<FunId> {
        self.blocks.get(&block).map(|b| b.fun)
    }

    /// The entry block of `fun`.
    #[must_use]
    pub fn entry(&self, fun: FunId) -> Option<BlockId> {
        self.function(fun).map(|f| f.entry)
    }

    /// Successor blocks of `block`.
    #[must_use]
    pub fn successors(&self, block: BlockId) -> &[BlockId] {
        self.blocks
            .get(&block)
            .map_or(&[], |b| b.successors.as_slice())
    }

    /// Predecessor blocks of `block`.
    #[must_use]
    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.blocks
            .get(&block)
            .map_or(&[], |b| b.predecessors.as_slice())
    }

    /// The callee entered from `block`, if it is a call site.
    #[must_use]
    pub fn call_target(&self, block: BlockId) -> Option<FunId> {
        self.blocks.get(&block).and_then(|b| b.calls)
    }

    /// Whether `block` is the target of a back edge in its function.
    #[must_use]
    pub fn is_loop_header(&self, block: BlockId) -> bool {
        self.blocks
            .get(&block)
            .and_then(|b| self.function(b.fun))
            .is_some_and(|f| f.loop_headers.contains(&block))
    }

    /// Whether `block` terminates its function (has no successors).
    #[must_use]
    pub fn is_exit(&self, block: BlockId) -> bool {
        self.blocks
            .get(&block)
            .is_some_and(|b| b.successors.is_empty())
    }

    /// Whether `from -> to` closes a loop in the function owning `from`.
    #[must_use]
    pub fn is_back_edge(&self, from: BlockId, to: BlockId) -> bool {
        self.blocks
            .get(&from)
            .and_then(|b| self.function(b.fun))
            .is_some_and(|f| f.back_edges.binary_search(&(from, to)).is_ok())
    }

    /// Number of functions.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of blocks across all functions.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
