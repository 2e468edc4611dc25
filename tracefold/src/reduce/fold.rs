use rustc_hash::FxHashSet;

use super::Event;
use crate::error::ReduceError;
use crate::program::BlockId;

/// Collapses runs of repeated structure in one segment's event list.
///
/// Two kinds of runs fold, both under the same rule (collapse only when the
/// run is longer than `k`): consecutive identical loop iterations anchored at
/// a loop header, and adjacent identical call events. `k = 0` disables
/// folding entirely, so every literal block survives.
///
/// Only complete iterations are counted; a trailing partial iteration stays
/// literal, which keeps [`super::Segment::flatten`] an exact inverse.
pub(super) fn fold_events(
    events: Vec<Event>,
    k: usize,
    headers: &FxHashSet<BlockId>,
    max_depth: usize,
) -> Result<Vec<Event>, ReduceError> {
    if k == 0 {
        return Ok(events);
    }
    fold_at_depth(&events, k, headers, 0, max_depth)
}

fn fold_at_depth(
    events: &[Event],
    k: usize,
    headers: &FxHashSet<BlockId>,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<Event>, ReduceError> {
    if depth >= max_depth {
        return Err(ReduceError::DepthLimit { limit: max_depth });
    }
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Block(header) if headers.contains(header) => {
                if let Some((period, count)) = header_run(events, i, *header) {
                    if count > k {
                        let body =
                            fold_at_depth(&events[i..i + period], k, headers, depth + 1, max_depth)?;
                        out.push(Event::Repeat { count, body });
                        i += count * period;
                        continue;
                    }
                }
                // Short or irregular runs stay literal; advancing one event
                // lets the scan reach headers nested inside the body.
                out.push(events[i].clone());
                i += 1;
            }
            Event::Call(_) => {
                let mut count = 1;
                while events.get(i + count) == Some(&events[i]) {
                    count += 1;
                }
                if count > k {
                    out.push(Event::Repeat {
                        count,
                        body: vec![events[i].clone()],
                    });
                } else {
                    out.extend(events[i..i + count].iter().cloned());
                }
                i += count;
            }
            event => {
                out.push(event.clone());
                i += 1;
            }
        }
    }
    Ok(out)
}

/// For a loop header at `start`, returns the iteration period (distance to
/// the next visit of the same header) and how many consecutive identical
/// iterations follow, including the first.
fn header_run(events: &[Event], start: usize, header: BlockId) -> Option<(usize, usize)> {
    let period = events[start + 1..]
        .iter()
        .position(|event| matches!(event, Event::Block(block) if *block == header))?
        + 1;
    let body = &events[start..start + period];
    let mut count = 1;
    while start + (count + 1) * period <= events.len()
        && &events[start + count * period..start + (count + 1) * period] == body
    {
        count += 1;
    }
    Some((period, count))
}
