//! # Tracefold
//!
//! Reduces raw control-flow execution traces into compact, deterministic
//! textual call trees.
//!
//! An upstream analysis (symbolic executor, model checker) follows one path
//! through a whole program and records every basic block it visits. Those
//! flat traces grow huge as soon as the path loops or recurses; `tracefold`
//! recovers the structure the flat sequence hides and collapses the
//! repetition:
//!
//! ```text
//! BlockId[]  (raw trace)
//!     │
//!     ├──> Segmentation (explicit frame stack)
//!     │      └─ split the trace into function activations at call/return edges
//!     │
//!     ├──> Loop folding (fold bound k)
//!     │      └─ collapse > k identical loop iterations into (body)xN markers
//!     │
//!     └──> Serialization
//!            └─ deterministic text: main{ 0 (1 2)x40 helper{ 7 8 } 3 }
//! ```
//!
//! The [`program::Program`] context is built once per whole program and
//! shared read-only (via `Arc`) by every [`reduce::PathReducer`]; reductions
//! are pure computation and may run concurrently.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tracefold::{PathReducer, Program};
//!
//! let mut builder = Program::builder();
//! let main = builder.add_function("main");
//! for block in [0, 1, 2] {
//!     builder.add_block(main, block);
//! }
//! builder.add_successor(0, 1);
//! builder.add_successor(1, 0); // back edge: 0 is a loop header
//! builder.add_successor(0, 2);
//! let program = Arc::new(builder.build()?);
//!
//! let reducer = PathReducer::new(program, 1);
//! let reduced = reducer.reduce(&[0, 1, 0, 1, 0, 2], main)?;
//! assert_eq!(reduced, "main{ (0 1)x2 0 2 }");
//! # Ok::<(), tracefold::ReduceError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod digest;
pub mod error;
pub mod format;
pub mod program;
pub mod reduce;

#[cfg(feature = "capi")]
#[allow(unsafe_code)]
pub mod capi;

pub use error::{ContextError, ReduceError};
pub use format::FormatError;
pub use program::{Block, BlockId, FunId, Function, Program, ProgramBuilder};
pub use reduce::{Event, PathReducer, Segment, DEFAULT_MAX_DEPTH, EMPTY_TRACE};
