//! The strategy registered as "tarjan".
//!
//! Another sorted-edge scan like Kruskal, but with an inline path-halving
//! find instead of [`super::UnionFind`]. The name predates this codebase
//! and is kept because clients request it on the wire.

use graphd_graph::GraphStore;

use super::{id_bound, MstStrategy};

pub struct Tarjan;

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

impl MstStrategy for Tarjan {
    fn name(&self) -> &'static str {
        "tarjan"
    }

    fn run(&self, graph: &GraphStore) -> GraphStore {
        let mut mst = graph.vertex_skeleton();
        let mut sorted: Vec<_> = graph.edges().copied().collect();
        sorted.sort_by_key(|e| (e.weight, e.u, e.v));

        let mut parent: Vec<usize> = (0..id_bound(graph)).collect();

        for edge in sorted {
            let ru = find(&mut parent, edge.u);
            let rv = find(&mut parent, edge.v);
            if ru != rv {
                parent[rv] = ru;
                mst.add_edge(edge);
            }
        }

        mst.ensure_distances();
        mst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphd_graph::Edge;

    #[test]
    fn matches_kruskal_on_a_cycle() {
        let mut g = GraphStore::with_vertices(4);
        g.add_edge(Edge::new(0, 1, 4));
        g.add_edge(Edge::new(1, 2, 3));
        g.add_edge(Edge::new(2, 3, 2));
        g.add_edge(Edge::new(0, 3, 1));

        let mst = Tarjan.run(&g);
        assert_eq!(mst.num_edges(), 3);
        assert_eq!(mst.total_weight(), 6);
        assert!(!mst.has_edge(0, 1), "the heaviest cycle edge is dropped");
    }
}
