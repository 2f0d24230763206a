//! Kruskal's algorithm: scan edges by weight, accept cycle-free ones.

use graphd_graph::GraphStore;

use super::{id_bound, MstStrategy, UnionFind};

pub struct Kruskal;

impl MstStrategy for Kruskal {
    fn name(&self) -> &'static str {
        "kruskal"
    }

    fn run(&self, graph: &GraphStore) -> GraphStore {
        let mut mst = graph.vertex_skeleton();
        let mut sorted: Vec<_> = graph.edges().copied().collect();
        sorted.sort_by_key(|e| (e.weight, e.u, e.v));

        let target = graph.num_vertices().saturating_sub(1);
        let mut uf = UnionFind::new(id_bound(graph));
        let mut accepted = 0usize;

        for edge in sorted {
            if uf.union(edge.u, edge.v) {
                mst.add_edge(edge);
                accepted += 1;
                if accepted == target {
                    break;
                }
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
    fn skips_cycle_closing_edges() {
        let mut g = GraphStore::with_vertices(3);
        g.add_edge(Edge::new(0, 1, 1));
        g.add_edge(Edge::new(1, 2, 1));
        g.add_edge(Edge::new(0, 2, 1));

        let mst = Kruskal.run(&g);
        assert_eq!(mst.num_edges(), 2);
        assert_eq!(mst.total_weight(), 2);
    }
}
