use std::fmt::Write;

use super::{Event, Segment};
use crate::program::Program;

/// Serializes a reduced call tree into its canonical text.
///
/// Grammar: a segment is `name{ events }` (or `name{}` when empty), a fold
/// marker is `(events)xN`, a block is its decimal id, and a nested call is a
/// nested segment. Functions without a declared name render as `f<id>`.
pub(super) fn render(segment: &Segment, program: &Program) -> String {
    let mut out = String::new();
    write_segment(&mut out, segment, program);
    out
}

fn write_segment(out: &mut String, segment: &Segment, program: &Program) {
    match program.function(segment.fun) {
        Some(function) if !function.name.is_empty() => out.push_str(&function.name),
        _ => {
            let _ = write!(out, "f{}", segment.fun);
        }
    }
    if segment.events.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{ ");
    write_events(out, &segment.events, program);
    out.push_str(" }");
}

fn write_events(out: &mut String, events: &[Event], program: &Program) {
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match event {
            Event::Block(block) => {
                let _ = write!(out, "{block}");
            }
            Event::Call(callee) => write_segment(out, callee, program),
            Event::Repeat { count, body } => {
                out.push('(');
                write_events(out, body, program);
                let _ = write!(out, ")x{count}");
            }
        }
    }
}
