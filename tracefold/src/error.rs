//! Error types for program construction and path reduction.

use crate::program::{BlockId, FunId};
use thiserror::Error;

/// Errors detected while building a [`crate::program::Program`].
///
/// All of these mean the supplied whole-program representation is structurally
/// broken; the context cannot be built and the input must be fixed upstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// An edge references a block that is not in the block universe.
    #[error("edge {from} -> {to} references a block outside the block universe")]
    DanglingEdge {
        /// Source block of the edge.
        from: BlockId,
        /// Target block of the edge.
        to: BlockId,
    },

    /// A successor edge connects blocks owned by two different functions.
    #[error("edge {from} -> {to} crosses from function {from_fun} into function {to_fun}")]
    CrossFunctionEdge {
        /// Source block of the edge.
        from: BlockId,
        /// Target block of the edge.
        to: BlockId,
        /// Function owning the source block.
        from_fun: FunId,
        /// Function owning the target block.
        to_fun: FunId,
    },

    /// A call mark targets a function that is not in the program.
    #[error("block {block} calls function {callee}, which is not in the program")]
    DanglingCall {
        /// The call-site block.
        block: BlockId,
        /// The missing callee.
        callee: FunId,
    },

    /// A call mark references a block that was never declared.
    #[error("call mark references unknown block {block}")]
    UnknownCallSite {
        /// The undeclared block.
        block: BlockId,
    },

    /// The same block id was declared more than once.
    #[error("duplicate block id {block}")]
    DuplicateBlock {
        /// The block declared twice.
        block: BlockId,
    },

    /// A block was attached to a function id that was never declared.
    #[error("block {block} is attached to unknown function {fun}")]
    UnknownFunction {
        /// The undeclared function id.
        fun: FunId,
        /// The orphaned block.
        block: BlockId,
    },

    /// A function declares no blocks, so it has no entry block.
    #[error("function {fun} (`{name}`) declares no blocks")]
    EmptyFunction {
        /// The offending function id.
        fun: FunId,
        /// Its declared name.
        name: String,
    },
}

/// Errors reported by [`crate::reduce::PathReducer::reduce`].
///
/// A failed reduction never corrupts the reducer or the shared program
/// context; the caller may retry with a corrected path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReduceError {
    /// The entry function named by the caller does not exist.
    #[error("entry function {0} is not in the program")]
    UnknownFunction(FunId),

    /// The path contains a block id outside the program's block universe.
    #[error("block {0} is not in the block universe")]
    UnknownBlock(BlockId),

    /// The path does not start at the entry block of the declared entry
    /// function.
    #[error("path starts at block {found}, expected entry block {expected} of function {fun}")]
    WrongEntryBlock {
        /// The declared entry function.
        fun: FunId,
        /// Its entry block.
        expected: BlockId,
        /// What the path actually starts with.
        found: BlockId,
    },

    /// A block belongs to neither the active function nor a callee reachable
    /// through a call edge from the current position.
    #[error(
        "block {block} belongs to function {owner}, which is neither the active \
         function {active} nor entered through a call edge"
    )]
    ForeignBlock {
        /// The offending block.
        block: BlockId,
        /// The function that owns it.
        owner: FunId,
        /// The function the walk was inside.
        active: FunId,
    },

    /// The path continues after the entry function already returned.
    #[error("block {block} appears after the entry function already returned")]
    TrailingBlock {
        /// The first block past the end of the trace.
        block: BlockId,
    },

    /// Activation or fold nesting went past the configured bound.
    #[error("nesting depth exceeded the configured limit of {limit}")]
    DepthLimit {
        /// The bound that was hit.
        limit: usize,
    },

    /// The program context itself was invalid.
    #[error(transparent)]
    Context(#[from] ContextError),
}
