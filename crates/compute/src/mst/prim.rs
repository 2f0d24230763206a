//! Prim's algorithm: grow one tree outward from a seed vertex.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use graphd_graph::{Edge, GraphStore};

use super::{id_bound, MstStrategy};

/// Min-heap entry; `BinaryHeap` is a max-heap, so ordering is reversed.
/// Ties break on endpoints to keep runs deterministic.
#[derive(Debug, PartialEq, Eq)]
struct HeapEdge(Edge);

impl Ord for HeapEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.0.weight, other.0.u, other.0.v).cmp(&(self.0.weight, self.0.u, self.0.v))
    }
}

impl PartialOrd for HeapEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct Prim;

impl MstStrategy for Prim {
    fn name(&self) -> &'static str {
        "prim"
    }

    fn run(&self, graph: &GraphStore) -> GraphStore {
        let mut mst = graph.vertex_skeleton();
        let Some(start) = graph.first_vertex_id() else {
            mst.ensure_distances();
            return mst;
        };

        let mut in_tree = vec![false; id_bound(graph)];
        let mut frontier = BinaryHeap::new();

        in_tree[start] = true;
        for &e in graph.incident_edges(start) {
            frontier.push(HeapEdge(e));
        }

        while let Some(HeapEdge(edge)) = frontier.pop() {
            let next = if in_tree[edge.u] { edge.v } else { edge.u };
            if in_tree[next] {
                continue;
            }
            in_tree[next] = true;
            mst.add_edge(edge);
            for &e in graph.incident_edges(next) {
                if !in_tree[e.other(next)] {
                    frontier.push(HeapEdge(e));
                }
            }
        }

        mst.ensure_distances();
        mst
    }
}
