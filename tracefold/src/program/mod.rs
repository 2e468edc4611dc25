//! Read-only whole-program context: block ownership, intra-function edges,
//! call linkage, and loop structure.
//!
//! A [`Program`] is built once per whole-program representation and then
//! shared (typically behind an `Arc`) by every reducer working on traces of
//! that program. Construction validates the representation up front; all
//! queries afterwards are cheap table lookups.

mod builder;
mod loops;
mod types;

pub use builder::ProgramBuilder;
pub use types::{Block, BlockId, FunId, Function, Program};

#[cfg(test)]
mod tests;
