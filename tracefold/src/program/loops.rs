use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{depth_first_search, DfsEvent};
use rustc_hash::{FxHashMap, FxHashSet};

use super::types::{Block, BlockId};

/// Finds the loop structure of one function: the targets of its back edges
/// and the back edges themselves.
///
/// A depth-first walk from the entry block reports an edge `u -> v` as a back
/// edge exactly when `v` is still on the walk's stack, which covers nested
/// loops and self-loops alike. Blocks unreachable from the entry cannot be
/// executed, so edges among them are ignored.
pub(super) fn function_loops(
    blocks: &FxHashMap<BlockId, Block>,
    fun_blocks: &[BlockId],
    entry: BlockId,
) -> (FxHashSet<BlockId>, Vec<(BlockId, BlockId)>) {
    let mut graph: DiGraph<BlockId, ()> = DiGraph::new();
    let mut index: FxHashMap<BlockId, NodeIndex> = FxHashMap::default();

    for &id in fun_blocks {
        index.insert(id, graph.add_node(id));
    }
    for &id in fun_blocks {
        let Some(block) = blocks.get(&id) else {
            continue;
        };
        let from = index[&id];
        for &succ in &block.successors {
            // Edges were validated as intra-function before this runs.
            if let Some(&to) = index.get(&succ) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let mut headers = FxHashSet::default();
    let mut back_edges = Vec::new();
    if let Some(&start) = index.get(&entry) {
        depth_first_search(&graph, Some(start), |event| {
            if let DfsEvent::BackEdge(from, to) = event {
                headers.insert(graph[to]);
                back_edges.push((graph[from], graph[to]));
            }
        });
    }
    back_edges.sort_unstable();
    back_edges.dedup();

    (headers, back_edges)
}
