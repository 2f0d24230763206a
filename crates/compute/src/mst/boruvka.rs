//! Borůvka's algorithm: every component claims its cheapest outgoing edge
//! each pass, halving the component count per round.

use graphd_graph::{Edge, GraphStore};

use super::{id_bound, MstStrategy, UnionFind};

pub struct Boruvka;

impl MstStrategy for Boruvka {
    fn name(&self) -> &'static str {
        "boruvka"
    }

    fn run(&self, graph: &GraphStore) -> GraphStore {
        let mut mst = graph.vertex_skeleton();
        let bound = id_bound(graph);
        let mut uf = UnionFind::new(bound);
        let mut components = graph.num_vertices();

        while components > 1 {
            let mut cheapest: Vec<Option<Edge>> = vec![None; bound];
            for edge in graph.edges() {
                let ru = uf.find(edge.u);
                let rv = uf.find(edge.v);
                if ru == rv {
                    continue;
                }
                for root in [ru, rv] {
                    let better = match cheapest[root] {
                        None => true,
                        Some(best) => {
                            (edge.weight, edge.u, edge.v) < (best.weight, best.u, best.v)
                        }
                    };
                    if better {
                        cheapest[root] = Some(*edge);
                    }
                }
            }

            let mut merged = 0usize;
            for edge in cheapest.into_iter().flatten() {
                // Two components may pick the same edge; union dedups it.
                if uf.union(edge.u, edge.v) {
                    mst.add_edge(edge);
                    merged += 1;
                }
            }

            if merged == 0 {
                // Remaining components have no edges between them.
                break;
            }
            components -= merged;
        }

        mst.ensure_distances();
        mst
    }
}
