//! Textual whole-program format and trace parsing.
//!
//! The program format is line-oriented. Functions are numbered in order of
//! appearance and the first block listed for a function is its entry block:
//!
//! ```text
//! Function: main
//! BasicBlock: 0
//! Successors: 1
//! BasicBlock: 1 calls helper
//! Successors: 2
//! BasicBlock: 2
//! Successors:
//!
//! Function: helper
//! BasicBlock: 10
//! Successors:
//! ```
//!
//! Blank lines separate sections but carry no meaning; `#` starts a comment
//! line. Traces are flat lists of block ids separated by whitespace or
//! commas, one trace per line.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::error::ContextError;
use crate::program::{BlockId, Program};

/// Errors from parsing the textual program or trace formats.
#[derive(Error, Debug)]
pub enum FormatError {
    /// A line did not match the grammar.
    #[error("line {line}: {msg}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        msg: String,
    },

    /// A `calls` annotation names a function that never appears in the file.
    #[error("line {line}: block {block} calls unknown function `{name}`")]
    UnknownCallee {
        /// 1-based line number.
        line: usize,
        /// The call-site block.
        block: BlockId,
        /// The unresolved function name.
        name: String,
    },

    /// A token in a trace line is not a block id.
    #[error("`{token}` is not a block id")]
    BadBlockId {
        /// The offending token.
        token: String,
    },

    /// The parsed tables were structurally invalid.
    #[error(transparent)]
    Context(#[from] ContextError),
}

fn syntax(line: usize, msg: impl Into<String>) -> FormatError {
    FormatError::Syntax {
        line,
        msg: msg.into(),
    }
}

/// Parses the textual program format and builds the validated [`Program`].
pub fn parse_program(input: &str) -> Result<Program, FormatError> {
    let mut builder = Program::builder();
    let mut names: FxHashMap<CompactString, u32> = FxHashMap::default();
    let mut current_fun = None;
    let mut current_block = None;
    let mut pending_calls: Vec<(BlockId, String, usize)> = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Function:") {
            let name = rest.trim();
            if name.is_empty() {
                return Err(syntax(lineno, "missing function name"));
            }
            let fun = builder.add_function(name);
            if names.insert(CompactString::from(name), fun).is_some() {
                return Err(syntax(lineno, format!("duplicate function `{name}`")));
            }
            current_fun = Some(fun);
            current_block = None;
        } else if let Some(rest) = line.strip_prefix("BasicBlock:") {
            let Some(fun) = current_fun else {
                return Err(syntax(lineno, "BasicBlock before any Function"));
            };
            let rest = rest.trim();
            let (id_part, callee) = match rest.split_once("calls") {
                Some((id, name)) => (id.trim(), Some(name.trim())),
                None => (rest, None),
            };
            let block = parse_id(id_part).ok_or_else(|| {
                syntax(lineno, format!("`{id_part}` is not a block id"))
            })?;
            builder.add_block(fun, block);
            current_block = Some(block);
            if let Some(name) = callee {
                if name.is_empty() {
                    return Err(syntax(lineno, "missing callee name after `calls`"));
                }
                pending_calls.push((block, name.to_owned(), lineno));
            }
        } else if let Some(rest) = line.strip_prefix("Successors:") {
            let Some(block) = current_block else {
                return Err(syntax(lineno, "Successors before any BasicBlock"));
            };
            for token in rest.split(|c: char| c.is_whitespace() || c == ',') {
                if token.is_empty() {
                    continue;
                }
                let succ = parse_id(token).ok_or_else(|| {
                    syntax(lineno, format!("`{token}` is not a block id"))
                })?;
                builder.add_successor(block, succ);
            }
        } else {
            return Err(syntax(lineno, format!("unrecognized directive `{line}`")));
        }
    }

    // Callees may be declared after their call sites; resolve at the end.
    for (block, name, lineno) in pending_calls {
        let Some(&callee) = names.get(name.as_str()) else {
            return Err(FormatError::UnknownCallee {
                line: lineno,
                block,
                name,
            });
        };
        builder.mark_call(block, callee);
    }

    Ok(builder.build()?)
}

/// Parses one trace line: block ids separated by whitespace or commas.
pub fn parse_trace(line: &str) -> Result<Vec<BlockId>, FormatError> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            parse_id(token).ok_or_else(|| FormatError::BadBlockId {
                token: token.to_owned(),
            })
        })
        .collect()
}

fn parse_id(token: &str) -> Option<BlockId> {
    token.parse().ok()
}
